//! SeaORM entity definitions.
//!
//! Dependency tree: instructor -> class_section -> recap -> attendance_record,
//! and class_section -> class_enrollment. Student is referenced by enrollments
//! and attendance records; course by class sections.

pub mod attendance_record;
pub mod class_enrollment;
pub mod class_section;
pub mod course;
pub mod instructor;
pub mod recap;
pub mod student;
