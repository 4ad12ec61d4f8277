use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use minisql::{Database, Table, parse_select};
use std::hint::black_box;

fn setup_company(n: usize) -> Database {
    let mut db = Database::new();
    db.create_table(&Table::with_columns("employee", &["id", "name", "deptId"]))
        .unwrap();
    db.create_table(&Table::with_columns("department", &["deptId", "name"]))
        .unwrap();

    for d in 0..10 {
        db.execute(&format!("INSERT INTO department VALUES ({d}, 'dept{d}')"))
            .unwrap();
    }
    for i in 0..n {
        db.execute(&format!(
            "INSERT INTO employee VALUES ({i}, 'user{i}', {})",
            i % 12
        ))
        .unwrap();
    }
    db
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Parse");
    group.bench_function("select_with_joins", |b| {
        let sql = "SELECT employee.name, department.name AS dept FROM employee \
                   LEFT JOIN department ON employee.deptId = department.deptId \
                   WHERE (department.name = 'dept1' OR department.name = 'dept2') \
                   ORDER BY employee.name DESC LIMIT 10 OFFSET 2";
        b.iter(|| parse_select(black_box(sql)).unwrap());
    });
    group.finish();
}

fn bench_select_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Select_Where_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            let db = setup_company(n);
            b.iter(|| {
                let res = db.query("SELECT * FROM employee WHERE deptId = 4").unwrap();
                black_box(res);
            });
        });
    }
    group.finish();
}

fn bench_join_kinds(c: &mut Criterion) {
    let mut group = c.benchmark_group("Join_Performance");
    let db = setup_company(2000);

    for kind in ["INNER", "LEFT", "RIGHT", "FULL OUTER"] {
        let sql = format!(
            "SELECT * FROM employee {kind} JOIN department \
             ON employee.deptId = department.deptId"
        );
        group.bench_with_input(BenchmarkId::from_parameter(kind), &sql, |b, sql| {
            b.iter(|| black_box(db.query(sql).unwrap()));
        });
    }
    group.bench_function("NATURAL", |b| {
        b.iter(|| black_box(db.query("SELECT * FROM employee NATURAL JOIN department").unwrap()));
    });
    group.finish();
}

fn bench_update_performance(c: &mut Criterion) {
    let mut group = c.benchmark_group("Update_Performance");

    for n in [1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, &n| {
            b.iter_with_setup(
                || setup_company(n),
                |mut db| {
                    db.execute("UPDATE employee SET deptId = 3 WHERE deptId = 11")
                        .unwrap();
                    black_box(db);
                },
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse,
    bench_select_scaling,
    bench_join_kinds,
    bench_update_performance
);
criterion_main!(benches);
