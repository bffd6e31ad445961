// ==========================================
// 物料库存报表系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 数据源连接统一只读打开，文件不存在时直接报错而不是新建空库
// - 统一 busy_timeout
// - 源表结构（测试 / 示例库生成共用）
// ==========================================

use rusqlite::{Connection, OpenFlags};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 报表依赖的三张源表
pub const SOURCE_TABLES: [&str; 3] = ["zmb51", "zstok", "fup"];

/// 源表结构
pub const SOURCE_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS zmb51 (
    material TEXT,
    centro TEXT,
    qtd_um_registro REAL,
    canal TEXT,
    data_de_lancamento TEXT
);

CREATE TABLE IF NOT EXISTS zstok (
    material TEXT,
    estoque_total REAL,
    cen TEXT
);

CREATE TABLE IF NOT EXISTS fup (
    material TEXT,
    qtde_pedido REAL,
    data_prev_entrada TEXT,
    data_de_remessa TEXT
);

CREATE INDEX IF NOT EXISTS idx_zmb51_material_date ON zmb51 (material, data_de_lancamento);
"#;

/// 配置 SQLite 连接的统一参数
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接（可写，不存在则创建）
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 只读打开 SQLite 连接（文件不存在时报错）
pub fn open_readonly_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化源表结构（幂等）
pub fn init_source_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SOURCE_SCHEMA_SQL)
}

/// 返回缺失的源表名
pub fn missing_source_tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 LIMIT 1",
    )?;

    let mut missing = Vec::new();
    for table in SOURCE_TABLES {
        if !stmt.exists([table])? {
            missing.push(table.to_string());
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_idempotent_and_complete() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(missing_source_tables(&conn).unwrap().len(), 3);

        init_source_schema(&conn).unwrap();
        init_source_schema(&conn).unwrap();

        assert!(missing_source_tables(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_readonly_open_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        let result = open_readonly_connection(path.to_str().unwrap());

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
