//! Backend adapters implementing the [`Bencher`] contract.

use bench_core::{BenchKind, Benchmark};

pub mod dqlite;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use dqlite::DqliteBencher;
pub use mysql::MysqlBencher;
pub use postgres::PostgresBencher;
pub use sqlite::SqliteBencher;

/// The benchmark catalog shared by the SQL backends.
pub fn standard_catalog() -> Vec<Benchmark> {
    vec![
        Benchmark::new(
            "inserts",
            BenchKind::Loop,
            "INSERT INTO dbbench_simple (id, balance) VALUES( {index}, {rand63});",
        ),
        Benchmark::new(
            "selects",
            BenchKind::Loop,
            "SELECT * FROM dbbench_simple WHERE id = {index};",
        ),
        Benchmark::new(
            "updates",
            BenchKind::Loop,
            "UPDATE dbbench_simple SET balance = {rand63} WHERE id = {index};",
        ),
        Benchmark::new(
            "deletes",
            BenchKind::Loop,
            "DELETE FROM dbbench_simple WHERE id = {index};",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_catalog_order_and_kinds() {
        let catalog = standard_catalog();
        let names: Vec<&str> = catalog.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["inserts", "selects", "updates", "deletes"]);
        assert!(catalog.iter().all(|b| b.kind == BenchKind::Loop));
    }

    #[test]
    fn test_catalog_templates_instantiate_cleanly() {
        let mut rng = StdRng::seed_from_u64(42);
        for benchmark in standard_catalog() {
            let stmt = bench_core::template::instantiate(&benchmark.stmt, 17, &mut rng);
            assert!(!stmt.contains('{'), "unresolved placeholder in {stmt}");
            assert!(stmt.contains("17"));
        }
    }
}
