// Small dev utility: create a sample source database (zmb51 / zstok / fup).
//
// Usage:
//   cargo run --bin seed_sample_db -- [db_path]
//
// An existing file at db_path is backed up before the new one is written.
// Dates are relative to today so the 12-month movement window always has data.

use chrono::{Duration, Local, Months, NaiveDate};
use material_stock_report::config::get_default_db_path;
use material_stock_report::db::{init_source_schema, open_sqlite_connection};
use rusqlite::{params, Connection};
use std::error::Error;
use std::fs;
use std::path::Path;

const MATERIALS: [&str; 5] = ["A8K3430", "A8K3230", "AAV8230", "AAV8330", "T671600"];
const SITES: [&str; 3] = ["CE01", "CE03", "CE07"];
const HISTORY_MONTHS: u32 = 14;

fn main() -> Result<(), Box<dyn Error>> {
    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_existing(&db_path)?;
    if let Some(parent) = Path::new(&db_path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let conn = open_sqlite_connection(&db_path)?;
    init_source_schema(&conn)?;

    let today = Local::now().date_naive();
    seed(&conn, today)?;
    print_counts(&conn)?;

    println!("db_path={}", db_path);
    Ok(())
}

fn backup_existing(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup = format!("{}.bak_{}", db_path, ts);
    fs::rename(path, &backup)?;
    println!("backup={}", backup);
    Ok(())
}

fn seed(conn: &Connection, today: NaiveDate) -> Result<(), Box<dyn Error>> {
    let tx = conn.unchecked_transaction()?;

    for (m_idx, material) in MATERIALS.iter().enumerate() {
        for back in 0..HISTORY_MONTHS {
            let month_start = today
                .checked_sub_months(Months::new(back))
                .ok_or("date out of range")?;

            for (s_idx, site) in SITES.iter().enumerate() {
                // T671600 只在 CE07 以外有移动
                if *material == "T671600" && *site == "CE07" {
                    continue;
                }
                let qty = ((m_idx + 1) * 3 + s_idx * 2 + back as usize % 4) as f64;
                let day = month_start - Duration::days((s_idx * 3) as i64);
                tx.execute(
                    "INSERT INTO zmb51 (material, centro, qtd_um_registro, canal, data_de_lancamento)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![material, site, -qty, "10", day.format("%Y-%m-%d").to_string()],
                )?;
            }
        }

        for (s_idx, site) in SITES.iter().enumerate() {
            let on_hand = ((m_idx + 1) * 40 + s_idx * 15) as f64;
            tx.execute(
                "INSERT INTO zstok (material, estoque_total, cen) VALUES (?1, ?2, ?3)",
                params![material, on_hand, site],
            )?;
        }

        let arrival = today + Duration::days(30 + m_idx as i64 * 7);
        let shipment = arrival - Duration::days(10);
        tx.execute(
            "INSERT INTO fup (material, qtde_pedido, data_prev_entrada, data_de_remessa)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                material,
                ((m_idx + 1) * 25) as f64,
                arrival.format("%Y-%m-%d").to_string(),
                shipment.format("%Y-%m-%d").to_string()
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

fn print_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    for table in ["zmb51", "zstok", "fup"] {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        println!("{}={}", table, count);
    }
    Ok(())
}
