// ==========================================
// 物料库存报表系统 - JSON 导出器
// ==========================================
// 格式: [ { "material": ..., "<列名>": 数值 | null, ... }, ... ]
// 字段顺序 = material + 宽表列顺序
// ==========================================

use crate::config::OutputFormat;
use crate::domain::matrix::{Cell, WideMatrix};
use crate::error::{ReportError, ReportResult};
use crate::exporter::{write_atomically, ReportExporter, ROW_KEY_FIELD};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use tracing::info;

pub struct JsonExporter {
    output_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// 渲染为 JSON 字节（4 空格缩进）
    pub fn render(matrix: &WideMatrix) -> serde_json::Result<Vec<u8>> {
        let names = matrix.column_names();
        let view = RecordsView {
            matrix,
            names: &names,
        };

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        view.serialize(&mut ser)?;
        Ok(buf)
    }
}

impl ReportExporter for JsonExporter {
    fn export(&self, matrix: &WideMatrix, destination: &str) -> ReportResult<PathBuf> {
        let path = self.output_dir.join(format!("{}.{}", destination, OutputFormat::Json.extension()));
        let bytes = Self::render(matrix)
            .map_err(|e| ReportError::export_failure(path.display().to_string(), e))?;
        write_atomically(&path, &bytes)?;

        info!(path = %path.display(), rows = matrix.row_count(), "文件已导出");
        Ok(path)
    }
}

struct RecordsView<'a> {
    matrix: &'a WideMatrix,
    names: &'a [String],
}

impl Serialize for RecordsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.matrix.row_count()))?;
        for (material, cells) in self.matrix.rows() {
            seq.serialize_element(&RowView {
                material,
                names: self.names,
                cells,
            })?;
        }
        seq.end()
    }
}

struct RowView<'a> {
    material: &'a str,
    names: &'a [String],
    cells: &'a [Cell],
}

impl Serialize for RowView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len() + 1))?;
        map.serialize_entry(ROW_KEY_FIELD, self.material)?;
        for (name, cell) in self.names.iter().zip(self.cells) {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ColumnKey;
    use serde_json::Value;

    fn sample() -> WideMatrix {
        let mut m = WideMatrix::new(
            "report",
            vec![ColumnKey::Site("CE07".into()), ColumnKey::Supplementary("possivel_reducao".into())],
        )
        .unwrap();
        m.set("T671600", "possivel_reducao", Some(2.0)).unwrap();
        m.set("A8K3430", "CE07", Some(100.0)).unwrap();
        m
    }

    #[test]
    fn test_render_records_with_nulls_and_order() {
        let bytes = JsonExporter::render(&sample()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        // material 字段在前，列顺序保持
        let first = text.find("\"material\"").unwrap();
        let ce07 = text.find("\"CE07\"").unwrap();
        let reducao = text.find("\"possivel_reducao\"").unwrap();
        assert!(first < ce07 && ce07 < reducao);
        assert!(text.contains("\n        \"material\": \"A8K3430\""));

        let value: Value = serde_json::from_str(&text).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["material"], "A8K3430");
        assert_eq!(rows[0]["CE07"], 100.0);
        assert!(rows[0]["possivel_reducao"].is_null());
        assert!(rows[1]["CE07"].is_null());
    }

    #[test]
    fn test_export_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = JsonExporter::new(&dir.path().join("output"));

        let path = exporter.export(&sample(), "zmb51_estoque_ce07").unwrap();

        assert_eq!(path, dir.path().join("output").join("zmb51_estoque_ce07.json"));
        assert!(path.exists());
    }
}
