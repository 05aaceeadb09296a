//! Services: blob storage, face recognition client and id generation.

pub mod recognition;
pub mod short_id;
pub mod storage;

pub use recognition::{
    EncodeOutcome, HttpRecognitionService, MergeOutcome, RecognitionService,
};
pub use storage::{BlobObject, BlobStore, MemoryBlobStore, S3BlobStore};
