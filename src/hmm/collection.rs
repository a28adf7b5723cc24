//! Named profile collection and the export sink seam

use crate::error::{ExportError, ExportResult};
use crate::hmm::model::Profile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Receipt for one exported profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedProfile {
    pub name: String,
    /// Artifact written for the profile, if the sink writes files
    pub file: Option<PathBuf>,
    pub rows: usize,
    pub positions: usize,
    pub bytes: u64,
}

impl ExportedProfile {
    /// Receipt for a profile that was not written anywhere
    pub fn unwritten(profile: &Profile) -> Self {
        Self {
            name: profile.name().to_string(),
            file: None,
            rows: profile.row_count(),
            positions: profile.positions(),
            bytes: 0,
        }
    }
}

/// Destination for finalized profiles
pub trait ProfileSink {
    fn write_profile(&mut self, profile: &Profile) -> ExportResult<ExportedProfile>;
}

/// Profiles keyed by name. Registering an existing name replaces it.
#[derive(Debug, Clone, Default)]
pub struct ProfileCollection {
    profiles: BTreeMap<String, Profile>,
}

impl ProfileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the profile previously stored under the
    /// same name
    pub fn register(&mut self, profile: Profile) -> Option<Profile> {
        self.profiles.insert(profile.name().to_string(), profile)
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    pub fn total_rows(&self) -> usize {
        self.profiles.values().map(Profile::row_count).sum()
    }

    /// Export a single profile by name
    pub fn export<S: ProfileSink + ?Sized>(
        &self,
        sink: &mut S,
        name: &str,
    ) -> ExportResult<ExportedProfile> {
        let profile = self
            .get(name)
            .ok_or_else(|| ExportError::ProfileNotFound(name.to_string()))?;
        sink.write_profile(profile)
    }

    /// Export every profile, stopping at the first failure
    pub fn export_all<S: ProfileSink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> ExportResult<Vec<ExportedProfile>> {
        self.profiles
            .values()
            .map(|p| sink.write_profile(p))
            .collect()
    }
}

impl FromIterator<Profile> for ProfileCollection {
    fn from_iter<I: IntoIterator<Item = Profile>>(iter: I) -> Self {
        let mut collection = Self::new();
        for profile in iter {
            collection.register(profile);
        }
        collection
    }
}

impl IntoIterator for ProfileCollection {
    type Item = Profile;
    type IntoIter = std::collections::btree_map::IntoValues<String, Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.into_values()
    }
}
