use minisql::*;

fn print(data: &Data) {
    let header: Vec<String> = data
        .columns()
        .iter()
        .map(|c| match &c.table {
            Some(table) => format!("{table}.{}", c.label()),
            None => c.label().to_string(),
        })
        .collect();
    for name in &header {
        print!("{name:<20}");
    }
    println!();
    println!("{}", "-".repeat(20 * header.len()));

    for row in data.rows() {
        for cell in row {
            print!("{:<20}", cell.as_deref().unwrap_or("NULL"));
        }
        println!();
    }
    println!();
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    println!("In-Memory SQL Demo\n");

    let mut db = Database::new();
    db.create_table(&Table::with_columns("employee", &["id", "name", "deptId"]))?;
    db.create_table(&Table::with_columns("department", &["deptId", "name"]))?;

    for sql in [
        "INSERT INTO employee VALUES (1, 'Bill', 1)",
        "INSERT INTO employee VALUES (2, 'Jane', 2)",
        "INSERT INTO employee (id, name) VALUES (3, 'Mark')",
        "INSERT INTO department VALUES (1, 'Sales')",
        "INSERT INTO department VALUES (2, 'Marketing')",
        "INSERT INTO department VALUES (3, 'Legal')",
    ] {
        db.execute(sql)?;
    }

    let queries = [
        "SELECT * FROM employee",
        "SELECT employee.name, department.name AS dept FROM employee \
         INNER JOIN department ON employee.deptId = department.deptId",
        "SELECT * FROM employee \
         FULL OUTER JOIN department ON employee.deptId = department.deptId",
        "SELECT name FROM employee WHERE name IN ('Bill', 'Mark') ORDER BY name DESC",
        "SELECT * FROM employee LIMIT 1 OFFSET 1",
    ];
    for sql in queries {
        let query = parse_select(sql)?;
        println!("{}\n", query.to_sql());
        print(&query.create_data(&db)?);
    }

    let updated = db.execute("UPDATE employee SET deptId = 3 WHERE name = 'mark'")?;
    println!("Updated {updated} row(s)\n");
    print(&db.query(
        "SELECT employee.name, department.name AS dept FROM employee \
         LEFT JOIN department ON employee.deptId = department.deptId",
    )?);

    if let Err(err) = parse_select("SELECT name FROM employee WHERE name ~ 'Bill'") {
        println!("Rejected: {err}");
    }

    println!("\nTables in database:");
    for table_name in db.list_tables() {
        println!("  - {table_name}");
    }

    Ok(())
}
