//! The tutorial sequence and per-tutorial themes.

use crate::{PagesError, Result};
use std::path::Path;

/// The tutorial that follows another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextTutorial {
    /// Folder name under `tutorials/`.
    pub folder: &'static str,
    /// Link text shown after "Next:".
    pub title: &'static str,
}

/// One tutorial of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tutorial {
    /// Folder name under `tutorials/`.
    pub folder: &'static str,
    /// Theme stylesheet name under `css/themes/`.
    pub theme: &'static str,
    /// Following tutorial, `None` for the last one.
    pub next: Option<NextTutorial>,
}

/// Tutorials in reading order.
pub const TUTORIALS: [Tutorial; 5] = [
    Tutorial {
        folder: "01-gaussian",
        theme: "gaussian",
        next: Some(NextTutorial {
            folder: "02-logistic",
            title: "Heart Disease Classification",
        }),
    },
    Tutorial {
        folder: "02-logistic",
        theme: "binomial",
        next: Some(NextTutorial {
            folder: "03-poisson",
            title: "Bike Rental Demand",
        }),
    },
    Tutorial {
        folder: "03-poisson",
        theme: "poisson",
        next: Some(NextTutorial {
            folder: "04-negbin",
            title: "Handling Overdispersion",
        }),
    },
    Tutorial {
        folder: "04-negbin",
        theme: "negbin",
        next: Some(NextTutorial {
            folder: "05-gamma",
            title: "Blood Pressure Prediction",
        }),
    },
    Tutorial {
        folder: "05-gamma",
        theme: "gamma",
        next: None,
    },
];

/// Look up a tutorial by folder name.
pub fn tutorial(folder: &str) -> Option<&'static Tutorial> {
    TUTORIALS.iter().find(|t| t.folder == folder)
}

/// Following tutorial for a folder.
///
/// The outer `None` means the folder is unknown; `Some(None)` means it is the
/// last tutorial.
pub fn next_tutorial(folder: &str) -> Option<Option<NextTutorial>> {
    tutorial(folder).map(|t| t.next)
}

/// Theme for a page, taken from the first tutorial folder named in its path.
pub fn theme_for_path(path: &Path) -> Result<&'static str> {
    let text = path.to_string_lossy();
    TUTORIALS
        .iter()
        .find(|t| text.contains(t.folder))
        .map(|t| t.theme)
        .ok_or_else(|| PagesError::UnknownTutorial(path.to_path_buf()))
}
