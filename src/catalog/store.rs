//! SQLite-backed particle catalog.
//!
//! Schema version is tracked through `PRAGMA user_version`; opening a
//! database written by a newer build fails instead of guessing at columns.

use crate::domain::model::{Particle, ParticleKind};
use crate::utils::error::{AnalysisError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/0001_init.sql"),
}];

pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

pub struct CatalogStore {
    conn: Connection,
}

struct ParticleRow {
    name: String,
    mass_gev: f64,
    charge: f64,
    spin: f64,
    kind: String,
    generation: u8,
}

impl ParticleRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            mass_gev: row.get(1)?,
            charge: row.get(2)?,
            spin: row.get(3)?,
            kind: row.get(4)?,
            generation: row.get(5)?,
        })
    }

    fn into_particle(self) -> Result<Particle> {
        let kind = ParticleKind::parse(&self.kind).ok_or_else(|| AnalysisError::ProcessingError {
            message: format!("Unknown particle kind '{}' for '{}'", self.kind, self.name),
        })?;
        Ok(Particle {
            name: self.name,
            mass_gev: self.mass_gev,
            charge: self.charge,
            spin: self.spin,
            kind,
            generation: self.generation,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT name, mass_gev, charge, spin, kind, generation FROM particles";

impl CatalogStore {
    /// Opens (or creates) the database file, creating parent directories first.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let started_at = Instant::now();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::bootstrap(conn)?;
        tracing::debug!(
            "Opened catalog database {} in {}ms",
            path.display(),
            started_at.elapsed().as_millis()
        );
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory()?)
    }

    fn bootstrap(mut conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    pub fn schema_version(&self) -> Result<u32> {
        current_user_version(&self.conn)
    }

    pub fn upsert(&self, particle: &Particle) -> Result<()> {
        upsert_on(&self.conn, particle)?;
        Ok(())
    }

    /// All rows are written in one transaction.
    pub fn upsert_all(&mut self, particles: &[Particle]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for particle in particles {
            upsert_on(&tx, particle)?;
        }
        tx.commit()?;
        tracing::debug!("Upserted {} particles", particles.len());
        Ok(particles.len())
    }

    pub fn list_by_mass(&self) -> Result<Vec<Particle>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY mass_gev ASC, name ASC", SELECT_COLUMNS))?;
        let rows = stmt
            .query_map([], ParticleRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(ParticleRow::into_particle).collect()
    }

    pub fn find(&self, name: &str) -> Result<Option<Particle>> {
        let row = self
            .conn
            .query_row(
                &format!("{} WHERE name = ?1", SELECT_COLUMNS),
                [name],
                ParticleRow::from_row,
            )
            .optional()?;
        row.map(ParticleRow::into_particle).transpose()
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM particles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn count_by_kind(&self) -> Result<Vec<(ParticleKind, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT kind, COUNT(*) FROM particles GROUP BY kind ORDER BY kind")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(kind, count)| {
                ParticleKind::parse(&kind)
                    .map(|k| (k, count as usize))
                    .ok_or_else(|| AnalysisError::ProcessingError {
                        message: format!("Unknown particle kind '{}'", kind),
                    })
            })
            .collect()
    }
}

fn upsert_on(conn: &Connection, particle: &Particle) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO particles (name, mass_gev, charge, spin, kind, generation)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(name) DO UPDATE SET
            mass_gev = excluded.mass_gev,
            charge = excluded.charge,
            spin = excluded.spin,
            kind = excluded.kind,
            generation = excluded.generation",
        params![
            particle.name,
            particle.mass_gev,
            particle.charge,
            particle.spin,
            particle.kind.as_str(),
            particle.generation,
        ],
    )
}

fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(AnalysisError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        tracing::info!("Applied catalog schema migration v{}", migration.version);
    }
    tx.commit()?;
    Ok(())
}

fn current_user_version(conn: &Connection) -> Result<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::standard_model;

    #[test]
    fn test_open_in_memory_applies_migrations() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert_eq!(store.schema_version().unwrap(), latest_version());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_all_and_list_by_mass() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        assert_eq!(store.upsert_all(&standard_model()).unwrap(), 17);
        assert_eq!(store.count().unwrap(), 17);

        let listed = store.list_by_mass().unwrap();
        assert!(listed.windows(2).all(|w| w[0].mass_gev <= w[1].mass_gev));
        assert_eq!(listed.last().unwrap().name, "top_quark");
        // massless first, ordered by name
        assert_eq!(listed[0].name, "gluon");
        assert_eq!(listed[1].name, "photon");
    }

    #[test]
    fn test_upsert_replaces_existing_row() {
        let store = CatalogStore::open_in_memory().unwrap();
        let mut top = Particle::new("top_quark", 173.0, 2.0 / 3.0, 0.5, ParticleKind::Quark, 3);
        store.upsert(&top).unwrap();
        top.mass_gev = 172.76;
        store.upsert(&top).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let found = store.find("top_quark").unwrap().unwrap();
        assert_eq!(found.mass_gev, 172.76);
        assert!(store.find("graviton").unwrap().is_none());
    }

    #[test]
    fn test_count_by_kind() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.upsert_all(&standard_model()).unwrap();
        let counts = store.count_by_kind().unwrap();
        assert_eq!(
            counts,
            vec![
                (ParticleKind::GaugeBoson, 4),
                (ParticleKind::Lepton, 6),
                (ParticleKind::Quark, 6),
                (ParticleKind::Scalar, 1),
            ]
        );
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/db/particle_physics.db");

        {
            let mut store = CatalogStore::open(&path).unwrap();
            store.upsert_all(&standard_model()).unwrap();
        }

        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.schema_version().unwrap(), latest_version());
        assert_eq!(store.count().unwrap(), 17);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        }

        match CatalogStore::open(&path) {
            Err(AnalysisError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            }) => {
                assert_eq!(db_version, 999);
                assert_eq!(latest_supported, latest_version());
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected schema version error"),
        }
    }
}
