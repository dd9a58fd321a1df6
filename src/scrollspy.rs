//! The scroll-spy behind the table-of-contents highlight, as a state machine.
//! The page script drives the same transitions from `IntersectionObserver`
//! callbacks; this module is the reference for them.

/// Viewport margin the page script observes headings with: a heading counts
/// as visible once it is 100px below the top and above the lower 60% of the
/// viewport.
pub const ROOT_MARGIN: &str = "-100px 0px -60% 0px";

/// A visibility change reported for one heading element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub id: String,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn entering(id: &str) -> Self {
        IntersectionEntry {
            id: id.to_owned(),
            is_intersecting: true,
        }
    }

    pub fn leaving(id: &str) -> Self {
        IntersectionEntry {
            id: id.to_owned(),
            is_intersecting: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Active {
    #[default]
    NoActive,
    Active(String),
}

#[derive(Debug, Default)]
pub struct ScrollSpy {
    state: Active,
}

impl ScrollSpy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one batch of intersection events. Each intersecting entry
    /// replaces the active heading, so when several intersect in one batch the
    /// last one in iteration order wins. Non-intersecting entries are ignored;
    /// the active heading only changes when another one comes into view.
    pub fn observe<I>(&mut self, batch: I) -> &Active
    where
        I: IntoIterator<Item = IntersectionEntry>,
    {
        for entry in batch {
            if entry.is_intersecting {
                self.state = Active::Active(entry.id);
            }
        }
        &self.state
    }

    pub fn state(&self) -> &Active {
        &self.state
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            Active::NoActive => None,
            Active::Active(id) => Some(id.as_str()),
        }
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_id() == Some(id)
    }
}
