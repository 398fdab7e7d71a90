use serde::{Deserialize, Serialize};
use std::fmt;

/// Right (OD) or left (OS) eye. Each eye is its own computation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Eye {
    Od,
    Os,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Od, Eye::Os];

    pub fn label(self) -> &'static str {
        match self {
            Eye::Od => "OD",
            Eye::Os => "OS",
        }
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per eye.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyePair<T> {
    pub od: T,
    pub os: T,
}

impl<T> EyePair<T> {
    pub fn new(od: T, os: T) -> Self {
        Self { od, os }
    }

    pub fn get(&self, eye: Eye) -> &T {
        match eye {
            Eye::Od => &self.od,
            Eye::Os => &self.os,
        }
    }

    pub fn get_mut(&mut self, eye: Eye) -> &mut T {
        match eye {
            Eye::Od => &mut self.od,
            Eye::Os => &mut self.os,
        }
    }

    pub fn map<U, F>(&self, mut f: F) -> EyePair<U>
    where
        F: FnMut(Eye, &T) -> U,
    {
        EyePair {
            od: f(Eye::Od, &self.od),
            os: f(Eye::Os, &self.os),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Eye, &T)> {
        [(Eye::Od, &self.od), (Eye::Os, &self.os)].into_iter()
    }
}

impl<T: Clone> EyePair<T> {
    pub fn both(value: T) -> Self {
        Self {
            od: value.clone(),
            os: value,
        }
    }
}
