// src/services/filename.rs

//! Platform detection from artifact filenames.
//!
//! Published artifacts follow
//! `<Project>.<branch>.<version>.<os>[-core]-<arch>[.installer].<ext>`,
//! e.g. `Radarr.master.5.2.6.8376.linux-musl-core-arm64.tar.gz`.

use crate::models::{Architecture, OperatingSystem};

/// Maps an artifact filename to platform metadata.
pub trait FilenameParser: Send + Sync {
    /// `None` when the name follows no recognised platform convention.
    fn parse_operating_system(&self, name: &str) -> Option<OperatingSystem>;
    fn parse_architecture(&self, name: &str) -> Architecture;
    /// Runtime flavour, empty when none applies.
    fn parse_runtime(&self, name: &str) -> String;
    fn parse_installer(&self, name: &str) -> bool;
}

/// Case-insensitive parser for the published naming convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionParser;

impl FilenameParser for ConventionParser {
    fn parse_operating_system(&self, name: &str) -> Option<OperatingSystem> {
        let name = name.to_ascii_lowercase();

        // musl before plain linux, it contains the latter
        if name.contains("linux-musl") {
            Some(OperatingSystem::LinuxMusl)
        } else if name.contains("linux") {
            Some(OperatingSystem::Linux)
        } else if name.contains("osx") {
            Some(OperatingSystem::Osx)
        } else if name.contains("freebsd") {
            Some(OperatingSystem::FreeBsd)
        } else if name.contains("windows") {
            Some(OperatingSystem::Windows)
        } else {
            None
        }
    }

    fn parse_architecture(&self, name: &str) -> Architecture {
        let name = name.to_ascii_lowercase();

        if name.contains("arm64") {
            Architecture::Arm64
        } else if name.contains("-arm.") || name.contains("-arm-") || name.ends_with("-arm") {
            Architecture::Arm
        } else if name.contains("x86") {
            Architecture::X86
        } else {
            Architecture::X64
        }
    }

    fn parse_runtime(&self, name: &str) -> String {
        if name.to_ascii_lowercase().contains("-core-") {
            "netcore".to_string()
        } else {
            String::new()
        }
    }

    fn parse_installer(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        name.contains("installer") || name.ends_with(".exe")
    }
}
