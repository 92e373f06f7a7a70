// src/watch/filter.rs

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::EventKind;
use notify::event::ModifyKind;

use crate::config::Config;

/// Pure predicates over the immutable configuration: which directories get
/// watched, and which change events count as relevant.
#[derive(Debug, Clone)]
pub struct PathFilter {
    exclude_dirs: HashSet<PathBuf>,
    extensions: HashSet<String>,
    rebuild_on_metadata: bool,
}

impl PathFilter {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            exclude_dirs: cfg.exclude_dirs.clone(),
            extensions: cfg.extensions.clone(),
            rebuild_on_metadata: cfg.rebuild_on_metadata,
        }
    }

    /// Returns false for hidden directories (name starts with `.`) and for
    /// directories in the configured exclusion set. The caller prunes the
    /// whole subtree when this returns false.
    pub fn should_watch_dir(&self, path: &Path) -> bool {
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            return false;
        }
        !self.exclude_dirs.contains(path)
    }

    /// Returns true only if the path's extension is in the configured set and
    /// the event kind carries a content or structural change.
    ///
    /// Access events (open/close notifications) are never relevant; writes
    /// always show up as create/modify/remove/rename kinds as well.
    /// Metadata-only events (chmod and friends) are ignored unless
    /// `rebuild_on_metadata` is set.
    pub fn is_relevant(&self, path: &Path, kind: &EventKind) -> bool {
        if matches!(kind, EventKind::Access(_)) {
            return false;
        }
        if !self.rebuild_on_metadata && matches!(kind, EventKind::Modify(ModifyKind::Metadata(_)))
        {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.contains(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, AccessMode, CreateKind, DataChange, MetadataKind, RemoveKind};

    fn filter(exclude: &[&str], exts: &[&str], rebuild_on_metadata: bool) -> PathFilter {
        PathFilter {
            exclude_dirs: exclude.iter().map(PathBuf::from).collect(),
            extensions: exts.iter().map(|s| s.to_string()).collect(),
            rebuild_on_metadata,
        }
    }

    #[test]
    fn hidden_directories_are_never_watched() {
        let f = filter(&[], &["rs"], false);
        assert!(!f.should_watch_dir(Path::new("/proj/.git")));
        assert!(!f.should_watch_dir(Path::new("/proj/.cache")));
        assert!(f.should_watch_dir(Path::new("/proj/src")));
    }

    #[test]
    fn excluded_directories_are_not_watched() {
        let f = filter(&["/proj/target"], &["rs"], false);
        assert!(!f.should_watch_dir(Path::new("/proj/target")));
        assert!(f.should_watch_dir(Path::new("/proj/src")));
    }

    #[test]
    fn only_configured_extensions_are_relevant() {
        let f = filter(&[], &["go"], false);
        let kind = EventKind::Modify(ModifyKind::Data(DataChange::Any));
        assert!(f.is_relevant(Path::new("/proj/main.go"), &kind));
        assert!(!f.is_relevant(Path::new("/proj/foo.txt"), &kind));
        assert!(!f.is_relevant(Path::new("/proj/Makefile"), &kind));
    }

    #[test]
    fn create_remove_and_rename_are_relevant() {
        let f = filter(&[], &["rs"], false);
        let path = Path::new("/proj/src/main.rs");
        assert!(f.is_relevant(path, &EventKind::Create(CreateKind::File)));
        assert!(f.is_relevant(path, &EventKind::Remove(RemoveKind::File)));
        assert!(f.is_relevant(path, &EventKind::Modify(ModifyKind::Name(
            notify::event::RenameMode::Any
        ))));
    }

    #[test]
    fn metadata_only_events_are_ignored_by_default() {
        let path = Path::new("/proj/src/main.rs");
        let chmod = EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions));

        let f = filter(&[], &["rs"], false);
        assert!(!f.is_relevant(path, &chmod));

        let f = filter(&[], &["rs"], true);
        assert!(f.is_relevant(path, &chmod));
    }

    #[test]
    fn access_events_are_never_relevant() {
        let f = filter(&[], &["rs"], true);
        let kind = EventKind::Access(AccessKind::Close(AccessMode::Write));
        assert!(!f.is_relevant(Path::new("/proj/src/main.rs"), &kind));
    }
}
