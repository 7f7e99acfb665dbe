//! Schema creation and seed loading.
//!
//! Every table is dropped, recreated with the dialect's DDL, and filled from
//! a `;`-delimited CSV file. The whole run happens in one transaction and is
//! rolled back if any step fails.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::any::{Any, AnyArguments};
use sqlx::query::Query;
use sqlx::{AnyConnection, AnyPool};
use tracing::{debug, info};

use super::dialect::{Dialect, TableStatements};
use super::error::{DbError, DbResult};

/// First-column values that mark a header row.
const HEADER_ID_COLUMNS: [&str; 4] = ["label_id", "recipe_id", "note_id", "user_id"];

/// Options for a bootstrap run.
#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    /// Directory holding the seed CSV files.
    pub seed_dir: PathBuf,
    /// Rebuild even when the store already has data.
    pub force: bool,
    /// bcrypt cost for users seeded with a plaintext password only.
    pub hash_cost: u32,
}

/// Rows loaded per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedCounts {
    pub labels: u64,
    pub recipes: u64,
    pub recipe_labels: u64,
    pub notes: u64,
    pub users: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapReport {
    /// The store already had labels and `force` was not set.
    Skipped,
    Seeded(SeedCounts),
}

/// Whether the store already holds data. A missing `label` table counts as
/// empty.
pub async fn populated(pool: &AnyPool) -> bool {
    match sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM `label`")
        .fetch_one(pool)
        .await
    {
        Ok(count) => count != 0,
        Err(e) => {
            debug!(error = %e, "label count failed, treating store as empty");
            false
        }
    }
}

/// Drop, recreate and seed every table.
pub async fn bootstrap(
    pool: &AnyPool,
    dialect: Dialect,
    options: &BootstrapOptions,
) -> DbResult<BootstrapReport> {
    if !options.force && populated(pool).await {
        info!("The database seems to be populated already; use --force to re-initialize it");
        return Ok(BootstrapReport::Skipped);
    }

    info!(dialect = %dialect, seed_dir = %options.seed_dir.display(), "bootstrapping database");
    let schema = dialect.schema();
    let mut tx = pool.begin().await?;

    let counts = SeedCounts {
        labels: load_table::<LabelSeed>(&mut tx, &schema.label, options).await?,
        recipes: load_table::<RecipeSeed>(&mut tx, &schema.recipe, options).await?,
        recipe_labels: load_table::<RecipeLabelSeed>(&mut tx, &schema.recipe_label, options)
            .await?,
        notes: load_table::<NoteSeed>(&mut tx, &schema.note, options).await?,
        users: load_table::<UserSeed>(&mut tx, &schema.user, options).await?,
    };

    tx.commit().await?;
    info!(?counts, "bootstrap complete");
    Ok(BootstrapReport::Seeded(counts))
}

async fn load_table<T: SeedRow>(
    conn: &mut AnyConnection,
    table: &TableStatements,
    options: &BootstrapOptions,
) -> DbResult<u64> {
    info!(table = table.table, "initializing table");

    sqlx::query(table.drop).execute(&mut *conn).await?;
    sqlx::query(table.create).execute(&mut *conn).await?;

    let path = options.seed_dir.join(table.seed_file);
    let rows = read_seed_file::<T>(&path)?;

    let mut inserted = 0;
    for row in rows {
        let row = row.prepare(options)?;
        let result = row.bind(sqlx::query(table.insert)).execute(&mut *conn).await?;
        inserted += result.rows_affected();
    }

    debug!(table = table.table, rows = inserted, "seeded table");
    Ok(inserted)
}

/// Read every data row of a seed file, skipping header rows.
fn read_seed_file<T: DeserializeOwned>(path: &Path) -> DbResult<Vec<T>> {
    let seed_err = |source| DbError::Seed {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)
        .map_err(seed_err)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(seed_err)?;
        if record
            .get(0)
            .is_some_and(|first| HEADER_ID_COLUMNS.contains(&first.trim()))
        {
            continue;
        }
        rows.push(record.deserialize(None).map_err(seed_err)?);
    }

    Ok(rows)
}

type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// A typed row of one seed file.
trait SeedRow: DeserializeOwned + Send {
    /// Adjust the row before insert.
    fn prepare(self, _options: &BootstrapOptions) -> DbResult<Self> {
        Ok(self)
    }

    /// Bind the row's values in column order of the table's insert statement.
    fn bind(self, query: AnyQuery<'_>) -> AnyQuery<'_>;
}

#[derive(Debug, Deserialize)]
struct LabelSeed {
    label_id: i64,
    label: String,
}

impl SeedRow for LabelSeed {
    fn bind(self, query: AnyQuery<'_>) -> AnyQuery<'_> {
        query.bind(self.label_id).bind(self.label.to_lowercase())
    }
}

#[derive(Debug, Deserialize)]
struct RecipeSeed {
    recipe_id: i64,
    title: String,
    recipe_body: String,
    total_time: i64,
    active_time: i64,
    deleted: i64,
}

impl SeedRow for RecipeSeed {
    fn bind(self, query: AnyQuery<'_>) -> AnyQuery<'_> {
        query
            .bind(self.recipe_id)
            .bind(self.title)
            .bind(self.recipe_body)
            .bind(self.total_time)
            .bind(self.active_time)
            .bind(self.deleted)
    }
}

#[derive(Debug, Deserialize)]
struct RecipeLabelSeed {
    recipe_id: i64,
    label_id: i64,
}

impl SeedRow for RecipeLabelSeed {
    fn bind(self, query: AnyQuery<'_>) -> AnyQuery<'_> {
        query.bind(self.recipe_id).bind(self.label_id)
    }
}

#[derive(Debug, Deserialize)]
struct NoteSeed {
    note_id: i64,
    recipe_id: i64,
    create_date: i64,
    note: String,
    flagged: i64,
}

impl SeedRow for NoteSeed {
    fn bind(self, query: AnyQuery<'_>) -> AnyQuery<'_> {
        query
            .bind(self.note_id)
            .bind(self.recipe_id)
            .bind(self.create_date)
            .bind(self.note)
            .bind(self.flagged)
    }
}

#[derive(Debug, Deserialize)]
struct UserSeed {
    user_id: i64,
    username: String,
    password: String,
    plaintext_pw_bootstrapping_only: String,
}

impl SeedRow for UserSeed {
    /// Users seeded without a hash get one derived from the plaintext column.
    fn prepare(mut self, options: &BootstrapOptions) -> DbResult<Self> {
        if self.password.trim().is_empty() {
            self.password = bcrypt::hash(&self.plaintext_pw_bootstrapping_only, options.hash_cost)?;
        }
        Ok(self)
    }

    fn bind(self, query: AnyQuery<'_>) -> AnyQuery<'_> {
        query
            .bind(self.user_id)
            .bind(self.username)
            .bind(self.password)
            .bind(self.plaintext_pw_bootstrapping_only)
    }
}
