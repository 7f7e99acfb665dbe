//! SQL dialects supported by the bootstrapper.
//!
//! Runtime queries are plain `?`-parameterized SQL that both SQLite and MySQL
//! accept. Only table creation differs, so each dialect carries its own
//! [`Schema`] with one [`TableStatements`] per table.

use std::fmt;

use serde::Deserialize;

/// Relational backends the store can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Dialect {
    #[serde(rename = "sqlite3", alias = "sqlite")]
    Sqlite,
    #[serde(rename = "mysql")]
    Mysql,
}

impl Dialect {
    /// Statement set used to (re)create every table for this dialect.
    pub fn schema(self) -> &'static Schema {
        match self {
            Dialect::Sqlite => &SQLITE_SCHEMA,
            Dialect::Mysql => &MYSQL_SCHEMA,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite3",
            Dialect::Mysql => "mysql",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drop/create/insert statements and the seed file for one table.
#[derive(Debug)]
pub struct TableStatements {
    pub table: &'static str,
    pub seed_file: &'static str,
    pub drop: &'static str,
    pub create: &'static str,
    pub insert: &'static str,
}

/// Every table of the recipe store, for one dialect.
#[derive(Debug)]
pub struct Schema {
    pub label: TableStatements,
    pub recipe: TableStatements,
    pub recipe_label: TableStatements,
    pub note: TableStatements,
    pub user: TableStatements,
}

impl Schema {
    /// Tables in load order.
    pub fn tables(&self) -> [&TableStatements; 5] {
        [
            &self.label,
            &self.recipe,
            &self.recipe_label,
            &self.note,
            &self.user,
        ]
    }
}

const DROP_LABEL: &str = "DROP TABLE IF EXISTS `label`";
const DROP_RECIPE: &str = "DROP TABLE IF EXISTS `recipe`";
const DROP_RECIPE_LABEL: &str = "DROP TABLE IF EXISTS `recipe_label`";
const DROP_NOTE: &str = "DROP TABLE IF EXISTS `note`";
const DROP_USER: &str = "DROP TABLE IF EXISTS `user`";

const INSERT_LABEL: &str = "INSERT INTO `label` (label_id, label) VALUES (?, ?)";
const INSERT_RECIPE: &str = "INSERT INTO `recipe` (recipe_id, title, recipe_body, total_time, active_time, deleted) VALUES (?, ?, ?, ?, ?, ?)";
const INSERT_RECIPE_LABEL: &str = "INSERT INTO `recipe_label` (recipe_id, label_id) VALUES (?, ?)";
const INSERT_NOTE: &str = "INSERT INTO `note` (note_id, recipe_id, create_date, note, flagged) VALUES (?, ?, ?, ?, ?)";
const INSERT_USER: &str = "INSERT INTO `user` (user_id, username, password, plaintext_pw_bootstrapping_only) VALUES (?, ?, ?, ?)";

static SQLITE_SCHEMA: Schema = Schema {
    label: TableStatements {
        table: "label",
        seed_file: "labels.csv",
        drop: DROP_LABEL,
        create: "CREATE TABLE `label` (`label_id` INTEGER PRIMARY KEY, `label` varchar(255) NOT NULL UNIQUE)",
        insert: INSERT_LABEL,
    },
    recipe: TableStatements {
        table: "recipe",
        seed_file: "recipes.csv",
        drop: DROP_RECIPE,
        create: "CREATE TABLE `recipe` (`recipe_id` INTEGER PRIMARY KEY, `title` varchar(255) NOT NULL, `recipe_body` text NOT NULL, `total_time` INTEGER NOT NULL, `active_time` INTEGER NOT NULL, `deleted` INTEGER NOT NULL DEFAULT 0)",
        insert: INSERT_RECIPE,
    },
    recipe_label: TableStatements {
        table: "recipe_label",
        seed_file: "recipe-label.csv",
        drop: DROP_RECIPE_LABEL,
        create: "CREATE TABLE `recipe_label` (`recipe_id` INTEGER NOT NULL, `label_id` INTEGER NOT NULL, PRIMARY KEY (`recipe_id`, `label_id`))",
        insert: INSERT_RECIPE_LABEL,
    },
    note: TableStatements {
        table: "note",
        seed_file: "notes.csv",
        drop: DROP_NOTE,
        create: "CREATE TABLE `note` (`note_id` INTEGER PRIMARY KEY, `recipe_id` INTEGER NOT NULL, `create_date` INTEGER NOT NULL, `note` text NOT NULL, `flagged` INTEGER NOT NULL DEFAULT 0)",
        insert: INSERT_NOTE,
    },
    user: TableStatements {
        table: "user",
        seed_file: "users.csv",
        drop: DROP_USER,
        create: "CREATE TABLE `user` (`user_id` INTEGER PRIMARY KEY, `username` varchar(255) NOT NULL UNIQUE, `password` varchar(255) NOT NULL, `plaintext_pw_bootstrapping_only` varchar(255) NOT NULL DEFAULT '')",
        insert: INSERT_USER,
    },
};

static MYSQL_SCHEMA: Schema = Schema {
    label: TableStatements {
        table: "label",
        seed_file: "labels.csv",
        drop: DROP_LABEL,
        create: "CREATE TABLE `label` (`label_id` bigint NOT NULL AUTO_INCREMENT, `label` varchar(255) NOT NULL, PRIMARY KEY (`label_id`), UNIQUE KEY `label` (`label`))",
        insert: INSERT_LABEL,
    },
    recipe: TableStatements {
        table: "recipe",
        seed_file: "recipes.csv",
        drop: DROP_RECIPE,
        create: "CREATE TABLE `recipe` (`recipe_id` bigint NOT NULL AUTO_INCREMENT, `title` varchar(255) NOT NULL, `recipe_body` text NOT NULL, `total_time` bigint NOT NULL, `active_time` bigint NOT NULL, `deleted` int NOT NULL DEFAULT 0, PRIMARY KEY (`recipe_id`), KEY `title` (`title`))",
        insert: INSERT_RECIPE,
    },
    recipe_label: TableStatements {
        table: "recipe_label",
        seed_file: "recipe-label.csv",
        drop: DROP_RECIPE_LABEL,
        create: "CREATE TABLE `recipe_label` (`recipe_id` bigint NOT NULL, `label_id` bigint NOT NULL, PRIMARY KEY (`recipe_id`, `label_id`))",
        insert: INSERT_RECIPE_LABEL,
    },
    note: TableStatements {
        table: "note",
        seed_file: "notes.csv",
        drop: DROP_NOTE,
        create: "CREATE TABLE `note` (`note_id` bigint NOT NULL AUTO_INCREMENT, `recipe_id` bigint NOT NULL, `create_date` bigint NOT NULL, `note` text NOT NULL, `flagged` int NOT NULL DEFAULT 0, PRIMARY KEY (`note_id`), KEY `recipe` (`recipe_id`))",
        insert: INSERT_NOTE,
    },
    user: TableStatements {
        table: "user",
        seed_file: "users.csv",
        drop: DROP_USER,
        create: "CREATE TABLE `user` (`user_id` bigint NOT NULL AUTO_INCREMENT, `username` varchar(255) NOT NULL, `password` varchar(255) NOT NULL, `plaintext_pw_bootstrapping_only` varchar(255) NOT NULL DEFAULT '', PRIMARY KEY (`user_id`), UNIQUE KEY `username` (`username`))",
        insert: INSERT_USER,
    },
};
