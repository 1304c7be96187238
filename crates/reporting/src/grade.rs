//! Focus-rate letter grading

use serde::{Serialize, Serializer};
use std::fmt;

/// Letter grade for a focus rate. Pure lookup, independent of the rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusGrade {
    APlus,
    A,
    BPlus,
    B,
    C,
    D,
}

impl FocusGrade {
    /// Band for a 0-100 focus rate.
    pub fn for_rate(rate: u32) -> Self {
        match rate {
            90.. => FocusGrade::APlus,
            80..=89 => FocusGrade::A,
            70..=79 => FocusGrade::BPlus,
            60..=69 => FocusGrade::B,
            50..=59 => FocusGrade::C,
            _ => FocusGrade::D,
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            FocusGrade::APlus => "A+",
            FocusGrade::A => "A",
            FocusGrade::BPlus => "B+",
            FocusGrade::B => "B",
            FocusGrade::C => "C",
            FocusGrade::D => "D",
        }
    }
}

impl fmt::Display for FocusGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

impl Serialize for FocusGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.letter())
    }
}
