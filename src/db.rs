//! Database handles and the store

use std::path::{Path, PathBuf};

use heed::types::{Bytes, Str, U32};
use heed::{Database, Env, EnvOpenOptions, RoTxn};

use crate::config::StoreConfig;
use crate::error::{err, invalid, Result};
use crate::principal::check_id;
use crate::record::ResourceType;

// Database type aliases
pub type Db = Database<Bytes, U32<byteorder::BigEndian>>;
pub type DbStr = Database<Bytes, Str>;

/// All database handles
#[derive(Clone, Copy)]
pub struct Dbs {
    /// [type][resource][team][tag][principal] -> stored role value
    pub records: Db,
    /// [team][tmb] -> member role
    pub members: DbStr,
    /// [type][resource][team] -> owner tmb
    pub owners: DbStr,
}

/// Embedded permission store. One LMDB environment per store.
pub struct Store {
    env: Env,
    dbs: Dbs,
    path: PathBuf,
}

impl Store {
    /// Open (or create) a store at `path` with default settings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(&StoreConfig {
            path: path.as_ref().to_path_buf(),
            ..StoreConfig::default()
        })
    }

    pub fn open_with(cfg: &StoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&cfg.path).map_err(err)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(cfg.map_size)
                .max_dbs(3)
                .open(&cfg.path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let dbs = Dbs {
            records: env.create_database(&mut tx, Some("records")).map_err(err)?,
            members: env.create_database(&mut tx, Some("members")).map_err(err)?,
            owners: env.create_database(&mut tx, Some("owners")).map_err(err)?,
        };
        tx.commit().map_err(err)?;
        tracing::info!(path = %cfg.path.display(), "permission store opened");
        Ok(Store { env, dbs, path: cfg.path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    pub(crate) fn dbs(&self) -> &Dbs {
        &self.dbs
    }

    /// Execute a read-only operation
    #[inline]
    pub(crate) fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.dbs, &self.env.read_txn().map_err(err)?)
    }

    /// Clear all databases (for testing)
    pub fn clear_all(&self) -> Result<()> {
        self.transact(|tx| tx.clear())
    }
}

/// Team-level scopes have no resource id; app and dataset scopes must have one
pub(crate) fn check_scope(rt: ResourceType, resource_id: Option<&str>, team_id: &str) -> Result<()> {
    check_id("teamId", team_id)?;
    match (rt, resource_id) {
        (ResourceType::Team, None) => Ok(()),
        (ResourceType::Team, Some(_)) => Err(invalid("team permissions take no resource id")),
        (_, Some(id)) => check_id("resourceId", id),
        (_, None) => Err(invalid(format!("{rt} permissions need a resource id"))),
    }
}
