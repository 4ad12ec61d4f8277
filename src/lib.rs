//! A miniature SQL engine: a reader-combinator parser for `SELECT`,
//! `INSERT` and `UPDATE`, and an executor that evaluates queries over
//! in-memory tables of string cells.
//!
//! ```
//! use minisql::{ColumnData, Database, Table};
//!
//! let mut db = Database::new();
//! db.create_table(&Table::with_columns("employee", &["id", "name", "deptId"])).unwrap();
//! db.create_table(&Table::with_columns("department", &["deptId", "name"])).unwrap();
//! db.execute("INSERT INTO employee VALUES (1, 'Bill', 10)").unwrap();
//! db.execute("INSERT INTO department VALUES (10, 'Sales')").unwrap();
//!
//! let data = db
//!     .query(
//!         "SELECT employee.name, department.name AS dept FROM employee
//!          INNER JOIN department ON employee.deptId = department.deptId",
//!     )
//!     .unwrap();
//! assert_eq!(data.columns()[1].label(), "dept");
//! assert_eq!(data.rows()[0], vec![Some("Bill".to_string()), Some("Sales".to_string())]);
//! ```

pub mod ast;
pub mod column;
pub mod condition;
pub mod data;
pub mod database;
pub mod error;
pub mod executor;
pub mod join;
pub mod parser;
pub mod reader;
pub mod table;
pub mod value;

pub use ast::{Direction, InsertQuery, SelectQuery, Sort, Statement, UpdateQuery};
pub use column::Column;
pub use condition::{Condition, Operand};
pub use data::{Cell, ColumnData, Data, Row};
pub use database::Database;
pub use error::{Error, Result, SyntaxError};
pub use executor::TableSource;
pub use join::{Join, JoinKind, JoinOn};
pub use parser::{parse, parse_select};
pub use table::Table;
pub use value::Value;
