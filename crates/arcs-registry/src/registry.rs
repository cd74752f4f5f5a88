//! The authoritative set of tracked arcs and tracked directories.
//!
//! # Persistence Contract
//!
//! Every mutation that changes the registry is followed by a synchronous
//! save of the whole document. If the save fails the mutation is rolled
//! back, so memory and disk never disagree about a change that "succeeded".
//!
//! # Read-With-Repair
//!
//! [`ArcRegistry::list_arcs`] is not a pure read: entries whose paths no
//! longer exist on disk are removed and the registry is saved before the
//! listing is returned.

use std::sync::Arc;

use arcs_core::{ArcClassifier, LocalArc};
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::error::RegistryError;
use crate::store::{DOCUMENT_VERSION, RegistryDocument, RegistryStore};

/// A registry shared between the scanner and its callers.
///
/// The lock serializes mutations (single writer). Scans only take short
/// read locks to check whether an arc is already tracked.
pub type SharedRegistry = Arc<RwLock<ArcRegistry>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Arc,
    Directory,
}

/// Tracked arcs and tracked directories, backed by a [`RegistryStore`].
///
/// # Examples
///
/// ```no_run
/// use arcs_core::ArcClassifier;
/// use arcs_registry::{ArcRegistry, JsonFileStore};
/// use camino::Utf8Path;
///
/// # fn example() -> Result<(), arcs_registry::RegistryError> {
/// let store = JsonFileStore::new("/home/user/.local/share/arcs/localArcs.json");
/// let mut registry = ArcRegistry::open(store, ArcClassifier::default())?;
///
/// registry.add_tracked_directory(Utf8Path::new("/home/user/arcs"))?;
/// for arc in registry.list_arcs()? {
///     println!("{} ({})", arc.name, arc.location);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ArcRegistry {
    arcs: FxHashSet<Utf8PathBuf>,
    directories: FxHashSet<Utf8PathBuf>,
    classifier: ArcClassifier,
    store: Box<dyn RegistryStore>,
}

impl ArcRegistry {
    /// Creates an empty registry without reading the store.
    #[must_use]
    pub fn new(store: impl RegistryStore + 'static, classifier: ArcClassifier) -> Self {
        Self {
            arcs: FxHashSet::default(),
            directories: FxHashSet::default(),
            classifier,
            store: Box::new(store),
        }
    }

    /// Creates a registry and loads the stored document.
    ///
    /// # Errors
    ///
    /// Returns any error from [`load`](Self::load).
    pub fn open(
        store: impl RegistryStore + 'static,
        classifier: ArcClassifier,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new(store, classifier);
        registry.load()?;
        Ok(registry)
    }

    /// Wraps the registry for sharing with a scanner.
    #[must_use]
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Replaces the in-memory state with the stored document.
    ///
    /// Leaves the registry untouched if nothing has been stored yet.
    /// Relative paths in a stored document are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the document exists but cannot be read
    /// or parsed.
    pub fn load(&mut self) -> Result<(), RegistryError> {
        let Some(document) = self.store.load()? else {
            info!("No registry document found, starting empty");
            return Ok(());
        };

        self.arcs = absolute_only(document.local_arcs, "arc");
        self.directories = absolute_only(document.directories, "directory");

        info!(
            arcs = self.arcs.len(),
            directories = self.directories.len(),
            "Registry loaded"
        );
        Ok(())
    }

    /// Saves the full registry state.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the store cannot be written.
    pub fn persist(&self) -> Result<(), RegistryError> {
        self.store.save(&self.document())
    }

    /// Returns the serializable form of the registry, paths sorted.
    #[must_use]
    pub fn document(&self) -> RegistryDocument {
        RegistryDocument {
            version: DOCUMENT_VERSION,
            directories: self.tracked_directories(),
            local_arcs: self.tracked_arcs(),
        }
    }

    /// Returns the classifier used to list tracked directories.
    #[inline]
    #[must_use]
    pub fn classifier(&self) -> &ArcClassifier {
        &self.classifier
    }

    /// Returns `true` if `path` is an explicitly tracked arc.
    #[inline]
    #[must_use]
    pub fn contains_arc(&self, path: &Utf8Path) -> bool {
        self.arcs.contains(path)
    }

    /// Returns `true` if `path` is a tracked directory.
    #[inline]
    #[must_use]
    pub fn contains_directory(&self, path: &Utf8Path) -> bool {
        self.directories.contains(path)
    }

    /// Explicitly tracked arcs, sorted.
    #[must_use]
    pub fn tracked_arcs(&self) -> Vec<Utf8PathBuf> {
        sorted(&self.arcs)
    }

    /// Tracked directories, sorted.
    #[must_use]
    pub fn tracked_directories(&self) -> Vec<Utf8PathBuf> {
        sorted(&self.directories)
    }

    /// Starts tracking an arc.
    ///
    /// Existing paths are stored with symlinks resolved, so an arc reached
    /// through different links is tracked once. Returns `false` (and does
    /// not touch the store) if it was already tracked.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RelativePath`] for relative paths, or the
    /// store error if persisting fails (the addition is rolled back).
    pub fn add_arc(&mut self, path: &Utf8Path) -> Result<bool, RegistryError> {
        let path = identity(path)?;
        self.apply(Entry::Arc, &path, true)
    }

    /// Starts tracking several arcs with a single save.
    ///
    /// Returns how many of them were not tracked before.
    ///
    /// # Errors
    ///
    /// Validates every path before changing anything. If persisting fails,
    /// none of the additions are kept.
    pub fn add_arcs<'a, I>(&mut self, paths: I) -> Result<usize, RegistryError>
    where
        I: IntoIterator<Item = &'a Utf8Path>,
    {
        let paths = paths
            .into_iter()
            .map(identity)
            .collect::<Result<Vec<_>, _>>()?;

        let added: Vec<Utf8PathBuf> = paths
            .into_iter()
            .filter(|path| self.arcs.insert(path.clone()))
            .collect();

        if added.is_empty() {
            return Ok(0);
        }

        if let Err(err) = self.persist() {
            for path in &added {
                self.arcs.remove(path);
            }
            return Err(err);
        }

        info!(count = added.len(), "Arcs added");
        Ok(added.len())
    }

    /// Stops tracking an arc. Removing an untracked path is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the store error if persisting fails (the removal is rolled back).
    pub fn remove_arc(&mut self, path: &Utf8Path) -> Result<bool, RegistryError> {
        let key = self.tracked_key(Entry::Arc, path);
        self.apply(Entry::Arc, &key, false)
    }

    /// Starts tracking a directory whose children are listed as arcs.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::RelativePath`] for relative paths, or the
    /// store error if persisting fails (the addition is rolled back).
    pub fn add_tracked_directory(&mut self, path: &Utf8Path) -> Result<bool, RegistryError> {
        let path = identity(path)?;
        self.apply(Entry::Directory, &path, true)
    }

    /// Stops tracking a directory. Removing an untracked path is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the store error if persisting fails (the removal is rolled back).
    pub fn remove_tracked_directory(&mut self, path: &Utf8Path) -> Result<bool, RegistryError> {
        let key = self.tracked_key(Entry::Directory, path);
        self.apply(Entry::Directory, &key, false)
    }

    /// Lists every arc the registry knows about, repairing stale entries.
    ///
    /// Arcs found inside tracked directories come first (directories in
    /// sorted order, children sorted), followed by explicitly tracked arcs.
    /// An arc reachable both ways is listed once.
    ///
    /// Tracked directories and tracked arcs that no longer exist are removed
    /// and the registry is saved before returning. A tracked directory that
    /// exists but cannot be read is skipped and kept.
    ///
    /// # Errors
    ///
    /// Returns the store error if saving the repaired registry fails. The
    /// stale entries are restored in that case.
    pub fn list_arcs(&mut self) -> Result<Vec<LocalArc>, RegistryError> {
        let mut listed = Vec::new();
        let mut seen = FxHashSet::default();
        let mut stale_directories = Vec::new();
        let mut stale_arcs = Vec::new();

        for directory in self.tracked_directories() {
            if !directory.exists() {
                stale_directories.push(directory);
                continue;
            }

            match self.arc_children(&directory) {
                Ok(children) => {
                    for child in children {
                        if seen.insert(child.clone()) {
                            listed.push(LocalArc::new(&child));
                        }
                    }
                }
                Err(e) => {
                    warn!(directory = %directory, error = %e, "Failed to read tracked directory");
                }
            }
        }

        for arc in self.tracked_arcs() {
            if !arc.exists() {
                stale_arcs.push(arc);
                continue;
            }
            if seen.insert(arc.clone()) {
                listed.push(LocalArc::new(&arc));
            }
        }

        if !stale_directories.is_empty() || !stale_arcs.is_empty() {
            self.prune(stale_directories, stale_arcs)?;
        }

        debug!(count = listed.len(), "Listed arcs");
        Ok(listed)
    }

    /// Immediate children of `directory` that classify as arcs, sorted.
    fn arc_children(&self, directory: &Utf8Path) -> std::io::Result<Vec<Utf8PathBuf>> {
        let mut children = Vec::new();

        for entry in std::fs::read_dir(directory.as_std_path())? {
            let entry = entry?;
            let Ok(child) = Utf8PathBuf::from_path_buf(entry.path()) else {
                debug!(path = %entry.path().display(), "Skipping non-UTF-8 entry");
                continue;
            };
            if self.classifier.is_arc(&child) {
                children.push(child.canonicalize_utf8().unwrap_or(child));
            }
        }

        children.sort();
        Ok(children)
    }

    fn prune(
        &mut self,
        stale_directories: Vec<Utf8PathBuf>,
        stale_arcs: Vec<Utf8PathBuf>,
    ) -> Result<(), RegistryError> {
        for directory in &stale_directories {
            warn!(directory = %directory, "Tracked directory no longer exists, removing");
            self.directories.remove(directory);
        }
        for arc in &stale_arcs {
            warn!(arc = %arc, "Tracked arc no longer exists, removing");
            self.arcs.remove(arc);
        }

        if let Err(err) = self.persist() {
            self.directories.extend(stale_directories);
            self.arcs.extend(stale_arcs);
            return Err(err);
        }
        Ok(())
    }

    /// The stored form of `path`: as given if tracked that way, otherwise
    /// with symlinks resolved.
    fn tracked_key(&self, entry: Entry, path: &Utf8Path) -> Utf8PathBuf {
        let set = match entry {
            Entry::Arc => &self.arcs,
            Entry::Directory => &self.directories,
        };
        if set.contains(path) {
            return path.to_owned();
        }
        path.canonicalize_utf8().unwrap_or_else(|_| path.to_owned())
    }

    fn set_mut(&mut self, entry: Entry) -> &mut FxHashSet<Utf8PathBuf> {
        match entry {
            Entry::Arc => &mut self.arcs,
            Entry::Directory => &mut self.directories,
        }
    }

    /// Inserts or removes one entry, persisting and rolling back on failure.
    fn apply(
        &mut self,
        entry: Entry,
        path: &Utf8Path,
        insert: bool,
    ) -> Result<bool, RegistryError> {
        let set = self.set_mut(entry);
        let changed = if insert {
            set.insert(path.to_owned())
        } else {
            set.remove(path)
        };

        if !changed {
            debug!(path = %path, ?entry, insert, "Registry unchanged");
            return Ok(false);
        }

        if let Err(err) = self.persist() {
            let set = self.set_mut(entry);
            if insert {
                set.remove(path);
            } else {
                set.insert(path.to_owned());
            }
            return Err(err);
        }

        info!(path = %path, ?entry, insert, "Registry updated");
        Ok(true)
    }
}

fn ensure_absolute(path: &Utf8Path) -> Result<(), RegistryError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(RegistryError::RelativePath(path.to_owned()))
    }
}

/// Absolute, symlink-free form of `path`. Paths that do not exist are kept
/// as given.
fn identity(path: &Utf8Path) -> Result<Utf8PathBuf, RegistryError> {
    ensure_absolute(path)?;
    Ok(path.canonicalize_utf8().unwrap_or_else(|_| path.to_owned()))
}

fn absolute_only(paths: Vec<Utf8PathBuf>, kind: &str) -> FxHashSet<Utf8PathBuf> {
    paths
        .into_iter()
        .filter(|path| {
            let keep = path.is_absolute();
            if !keep {
                warn!(path = %path, kind, "Ignoring relative path in registry document");
            }
            keep
        })
        .collect()
}

fn sorted(set: &FxHashSet<Utf8PathBuf>) -> Vec<Utf8PathBuf> {
    let mut paths: Vec<Utf8PathBuf> = set.iter().cloned().collect();
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonFileStore;
    use arcs_core::DEFAULT_MARKER_FILE;
    use std::fs;
    use tempfile::TempDir;

    /// A store whose saves always fail.
    #[derive(Debug)]
    struct ReadOnlyStore;

    impl RegistryStore for ReadOnlyStore {
        fn load(&self) -> Result<Option<RegistryDocument>, RegistryError> {
            Ok(None)
        }

        fn save(&self, _document: &RegistryDocument) -> Result<(), RegistryError> {
            Err(RegistryError::io(
                "/read-only/localArcs.json",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ))
        }
    }

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
        data_file: Utf8PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = Utf8PathBuf::from_path_buf(dir.path().canonicalize().unwrap()).unwrap();
            let data_file = root.join("state").join("localArcs.json");
            Self {
                _dir: dir,
                root,
                data_file,
            }
        }

        fn registry(&self) -> ArcRegistry {
            ArcRegistry::open(JsonFileStore::new(self.data_file.clone()), ArcClassifier::default())
                .unwrap()
        }

        fn make_arc(&self, relative: &str) -> Utf8PathBuf {
            let path = self.root.join(relative);
            fs::create_dir_all(&path).unwrap();
            fs::write(path.join(DEFAULT_MARKER_FILE), b"").unwrap();
            path
        }

        fn make_dir(&self, relative: &str) -> Utf8PathBuf {
            let path = self.root.join(relative);
            fs::create_dir_all(&path).unwrap();
            path
        }
    }

    #[test]
    fn test_open_without_document_is_empty() {
        let fixture = Fixture::new();
        let registry = fixture.registry();
        assert!(registry.tracked_arcs().is_empty());
        assert!(registry.tracked_directories().is_empty());
        assert!(!fixture.data_file.exists());
    }

    #[test]
    fn test_add_arc_is_idempotent() {
        let fixture = Fixture::new();
        let arc = fixture.make_arc("repo");
        let mut registry = fixture.registry();

        assert!(registry.add_arc(&arc).unwrap());
        let once = registry.tracked_arcs();
        assert!(!registry.add_arc(&arc).unwrap());

        assert_eq!(registry.tracked_arcs(), once);
        assert_eq!(once, vec![arc]);
    }

    #[test]
    fn test_remove_absent_arc_is_noop() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry();

        assert!(!registry.remove_arc(Utf8Path::new("/not/tracked")).unwrap());
        assert!(!fixture.data_file.exists());
    }

    #[test]
    fn test_add_relative_path_rejected() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry();

        let err = registry.add_arc(Utf8Path::new("relative/repo")).unwrap_err();
        assert!(err.is_input_error());
        let err = registry
            .add_tracked_directory(Utf8Path::new("relative"))
            .unwrap_err();
        assert!(err.is_input_error());
        assert!(registry.tracked_arcs().is_empty());
    }

    #[test]
    fn test_mutations_persist_immediately() {
        let fixture = Fixture::new();
        let arc = fixture.make_arc("repo");
        let projects = fixture.make_dir("projects");

        {
            let mut registry = fixture.registry();
            registry.add_arc(&arc).unwrap();
            registry.add_tracked_directory(&projects).unwrap();
        }

        let reloaded = fixture.registry();
        assert!(reloaded.contains_arc(&arc));
        assert!(reloaded.contains_directory(&projects));

        {
            let mut registry = fixture.registry();
            registry.remove_arc(&arc).unwrap();
            registry.remove_tracked_directory(&projects).unwrap();
        }

        let reloaded = fixture.registry();
        assert!(reloaded.tracked_arcs().is_empty());
        assert!(reloaded.tracked_directories().is_empty());
    }

    #[test]
    fn test_persist_load_round_trip() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry();
        let arcs = [
            Utf8PathBuf::from("/z/last"),
            Utf8PathBuf::from("/a/first"),
            Utf8PathBuf::from("/m/middle"),
        ];
        registry
            .add_arcs(arcs.iter().map(Utf8PathBuf::as_path))
            .unwrap();
        registry
            .add_tracked_directory(Utf8Path::new("/projects"))
            .unwrap();

        let reloaded = fixture.registry();
        assert_eq!(reloaded.tracked_arcs(), registry.tracked_arcs());
        assert_eq!(reloaded.tracked_directories(), registry.tracked_directories());
        assert_eq!(reloaded.document(), registry.document());
    }

    #[test]
    fn test_add_arcs_counts_new_only() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry();
        registry.add_arc(Utf8Path::new("/a/one")).unwrap();

        let added = registry
            .add_arcs([Utf8Path::new("/a/one"), Utf8Path::new("/a/two"), Utf8Path::new("/a/two")])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(
            registry.tracked_arcs(),
            vec![Utf8PathBuf::from("/a/one"), Utf8PathBuf::from("/a/two")]
        );
    }

    #[test]
    fn test_add_arcs_validates_before_changing() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry();

        let result = registry.add_arcs([Utf8Path::new("/a/one"), Utf8Path::new("relative")]);
        assert!(matches!(result, Err(RegistryError::RelativePath(_))));
        assert!(registry.tracked_arcs().is_empty());
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let mut registry = ArcRegistry::new(ReadOnlyStore, ArcClassifier::default());

        assert!(registry.add_arc(Utf8Path::new("/a/repo")).is_err());
        assert!(!registry.contains_arc(Utf8Path::new("/a/repo")));

        assert!(registry.add_tracked_directory(Utf8Path::new("/projects")).is_err());
        assert!(!registry.contains_directory(Utf8Path::new("/projects")));

        assert!(registry
            .add_arcs([Utf8Path::new("/a/one"), Utf8Path::new("/a/two")])
            .is_err());
        assert!(registry.tracked_arcs().is_empty());
    }

    #[test]
    fn test_list_tracked_directory_children() {
        let fixture = Fixture::new();
        let projects = fixture.make_dir("projects");
        let repo_a = fixture.make_arc("projects/repoA");
        fixture.make_dir("projects/repoB");
        fs::write(projects.join("notes.txt"), b"").unwrap();

        let mut registry = fixture.registry();
        registry.add_tracked_directory(&projects).unwrap();

        let arcs = registry.list_arcs().unwrap();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].location, repo_a);
        assert_eq!(arcs[0].name, "repoA");
    }

    #[test]
    fn test_list_does_not_recurse() {
        let fixture = Fixture::new();
        let projects = fixture.make_dir("projects");
        fixture.make_arc("projects/group/nested-arc");

        let mut registry = fixture.registry();
        registry.add_tracked_directory(&projects).unwrap();

        assert!(registry.list_arcs().unwrap().is_empty());
    }

    #[test]
    fn test_list_orders_directories_then_arcs() {
        let fixture = Fixture::new();
        let projects = fixture.make_dir("projects");
        let beta = fixture.make_arc("projects/beta");
        let alpha = fixture.make_arc("projects/alpha");
        let standalone = fixture.make_arc("elsewhere/standalone");

        let mut registry = fixture.registry();
        registry.add_arc(&standalone).unwrap();
        registry.add_arc(&beta).unwrap();
        registry.add_tracked_directory(&projects).unwrap();

        let locations: Vec<Utf8PathBuf> = registry
            .list_arcs()
            .unwrap()
            .into_iter()
            .map(|arc| arc.location)
            .collect();
        assert_eq!(locations, vec![alpha, beta, standalone]);
    }

    #[test]
    fn test_list_heals_deleted_arc() {
        let fixture = Fixture::new();
        let keep = fixture.make_arc("keep");
        let gone = fixture.make_arc("gone");

        let mut registry = fixture.registry();
        registry.add_arc(&keep).unwrap();
        registry.add_arc(&gone).unwrap();

        fs::remove_dir_all(&gone).unwrap();

        let arcs = registry.list_arcs().unwrap();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].location, keep);
        assert!(!registry.contains_arc(&gone));

        let reloaded = fixture.registry();
        assert_eq!(reloaded.tracked_arcs(), vec![keep]);
    }

    #[test]
    fn test_list_heals_deleted_directory() {
        let fixture = Fixture::new();
        let projects = fixture.make_dir("projects");
        fixture.make_arc("projects/repoA");

        let mut registry = fixture.registry();
        registry.add_tracked_directory(&projects).unwrap();
        fs::remove_dir_all(&projects).unwrap();

        assert!(registry.list_arcs().unwrap().is_empty());
        assert!(!registry.contains_directory(&projects));
        assert!(fixture.registry().tracked_directories().is_empty());
    }

    #[test]
    fn test_list_keeps_existing_arc_without_marker() {
        let fixture = Fixture::new();
        let plain = fixture.make_dir("plain");

        let mut registry = fixture.registry();
        registry.add_arc(&plain).unwrap();

        let arcs = registry.list_arcs().unwrap();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].location, plain);
    }

    #[test]
    fn test_list_deduplicates_arcs() {
        let fixture = Fixture::new();
        let projects = fixture.make_dir("projects");
        let repo = fixture.make_arc("projects/repo");

        let mut registry = fixture.registry();
        registry.add_tracked_directory(&projects).unwrap();
        registry.add_arc(&repo).unwrap();

        let arcs = registry.list_arcs().unwrap();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].location, repo);
    }

    #[test]
    fn test_load_drops_relative_paths() {
        let fixture = Fixture::new();
        fs::create_dir_all(fixture.data_file.parent().unwrap()).unwrap();
        fs::write(
            &fixture.data_file,
            r#"{"directories": ["relative/dir"], "localArcs": ["/abs/arc", "rel"]}"#,
        )
        .unwrap();

        let registry = fixture.registry();
        assert_eq!(registry.tracked_arcs(), vec![Utf8PathBuf::from("/abs/arc")]);
        assert!(registry.tracked_directories().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_arc_tracked_once() {
        let fixture = Fixture::new();
        let real = fixture.make_arc("real/repo");
        std::os::unix::fs::symlink(fixture.root.join("real"), fixture.root.join("link")).unwrap();
        let linked = fixture.root.join("link/repo");
        let mut registry = fixture.registry();

        assert!(registry.add_arc(&linked).unwrap());
        assert!(!registry.add_arc(&real).unwrap());
        assert_eq!(registry.add_arcs([linked.as_path(), real.as_path()]).unwrap(), 0);

        assert_eq!(registry.tracked_arcs(), vec![real.clone()]);
        assert!(registry.contains_arc(&real));

        let arcs = registry.list_arcs().unwrap();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].location, real);

        assert!(registry.remove_arc(&linked).unwrap());
        assert!(registry.tracked_arcs().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_tracked_once() {
        let fixture = Fixture::new();
        let projects = fixture.make_dir("projects");
        fixture.make_arc("projects/repoA");
        std::os::unix::fs::symlink(&projects, fixture.root.join("shortcut")).unwrap();
        let mut registry = fixture.registry();

        assert!(registry.add_tracked_directory(&fixture.root.join("shortcut")).unwrap());
        assert!(!registry.add_tracked_directory(&projects).unwrap());
        assert_eq!(registry.tracked_directories(), vec![projects.clone()]);

        registry.add_arc(&projects.join("repoA")).unwrap();
        assert_eq!(registry.list_arcs().unwrap().len(), 1);
    }

    #[test]
    fn test_shared_registry_lookup() {
        let fixture = Fixture::new();
        let mut registry = fixture.registry();
        registry.add_arc(Utf8Path::new("/a/repo")).unwrap();

        let shared = registry.into_shared();
        assert!(shared.read().contains_arc(Utf8Path::new("/a/repo")));
        shared.write().remove_arc(Utf8Path::new("/a/repo")).unwrap();
        assert!(!shared.read().contains_arc(Utf8Path::new("/a/repo")));
    }
}
