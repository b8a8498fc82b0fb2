use crate::types::DirectoryEntry;

/// Canonical listing order: directories first, then files, each group sorted
/// by name with plain (case-sensitive) byte comparison.
pub fn sort_entries(mut entries: Vec<DirectoryEntry>) -> Vec<DirectoryEntry> {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.cmp(&b.name))
    });
    entries
}
