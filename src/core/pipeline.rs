use crate::core::export::{
    render_bundle, render_csv, render_json, render_text, ExportFormat, MixReport,
    DEFAULT_BUNDLE_FILENAME, DEFAULT_CSV_FILENAME, DEFAULT_JSON_FILENAME, DEFAULT_TXT_FILENAME,
};
use crate::core::interleave::{summarize_pools, Interleaver};
use crate::core::registry::PoolRegistry;
use crate::core::{ConfigProvider, MixOutcome, Pipeline, PoolSource, Storage};
use crate::utils::error::{MixerError, Result};
use std::path::Path;

pub struct MixPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MixPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, filename: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), filename)
    }
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 依副檔名解析來源檔：`.txt` 一行一筆，`.csv` 取所有非空白儲存格
pub fn decode_source(path: &str, data: &[u8]) -> Result<Vec<String>> {
    // 去掉開頭的 BOM，否則第一筆會躲過去重
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("txt") => Ok(String::from_utf8_lossy(data)
            .lines()
            .map(String::from)
            .collect()),
        Some("csv") => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(data);

            let mut cells = Vec::new();
            for row in reader.byte_records() {
                let row = row?;
                for field in row.iter() {
                    let cell = String::from_utf8_lossy(field);
                    if !cell.trim().is_empty() {
                        cells.push(cell.into_owned());
                    }
                }
            }
            Ok(cells)
        }
        _ => Err(MixerError::UnsupportedSource {
            path: path.to_string(),
        }),
    }
}

/// 將來源併入同名的池（沒有就新增），回傳 (新增筆數, 捨棄筆數)
fn merge_source(registry: &mut PoolRegistry, source: &PoolSource) -> Result<(usize, usize)> {
    // 預設池名稱相同時併入既有的池
    let id = match registry.find_by_name(&source.name) {
        Some(pool) => pool.id,
        None => registry.add_pool(&source.name)?,
    };

    let before = registry.get(id).map(|pool| pool.len()).unwrap_or(0);
    let kept = registry.append_records(id, &source.lines.join("\n"))?;
    let added = kept.saturating_sub(before);
    Ok((added, source.lines.len().saturating_sub(added)))
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MixPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<PoolSource>> {
        let mut sources = Vec::with_capacity(self.config.pools().len());

        for spec in self.config.pools() {
            let mut lines = Vec::new();
            for path in &spec.sources {
                let data = self.storage.read_file(path).await?;
                let decoded = decode_source(path, &data)?;
                tracing::debug!("📄 {} -> {} raw lines", path, decoded.len());
                lines.extend(decoded);
            }

            tracing::info!(
                "📥 Pool '{}': {} raw lines from {} source(s)",
                spec.name,
                lines.len(),
                spec.sources.len()
            );
            sources.push(PoolSource {
                name: spec.name.clone(),
                lines,
            });
        }

        Ok(sources)
    }

    async fn transform(&self, sources: Vec<PoolSource>) -> Result<MixOutcome> {
        let mut registry = if self.config.seed_default_pools() {
            PoolRegistry::with_default_pools()
        } else {
            PoolRegistry::new()
        };

        for source in sources {
            let (added, rejected) = merge_source(&mut registry, &source)?;
            if rejected > 0 {
                tracing::debug!(
                    "🧹 Pool '{}': dropped {} invalid or duplicate lines",
                    source.name,
                    rejected
                );
            }
            tracing::info!("✅ Pool '{}': {} valid user agents added", source.name, added);
        }

        let primary = self.config.primary_name();
        let mixed = Interleaver::new(primary)
            .starting_at(self.config.start_cursor())
            .run(registry.list_pools())?;

        tracing::info!("🔀 Mixed {} user agents successfully!", mixed.len());

        Ok(MixOutcome {
            primary: primary.to_string(),
            pools: summarize_pools(registry.list_pools(), primary),
            mixed,
        })
    }

    async fn load(&self, outcome: MixOutcome) -> Result<String> {
        let names = self.config.filenames();
        let mut rendered: Vec<(String, Vec<u8>)> = Vec::new();

        for format in self.config.output_formats() {
            let (filename, data) = match format.parse::<ExportFormat>()? {
                ExportFormat::Txt => (
                    names.txt.clone().unwrap_or_else(|| DEFAULT_TXT_FILENAME.to_string()),
                    render_text(&outcome.mixed).into_bytes(),
                ),
                ExportFormat::Csv => (
                    names.csv.clone().unwrap_or_else(|| DEFAULT_CSV_FILENAME.to_string()),
                    render_csv(&outcome.mixed)?.into_bytes(),
                ),
                ExportFormat::Json => (
                    names.json.clone().unwrap_or_else(|| DEFAULT_JSON_FILENAME.to_string()),
                    render_json(&MixReport::from_outcome(&outcome))?.into_bytes(),
                ),
            };

            if rendered.iter().any(|(existing, _)| existing == &filename) {
                continue;
            }
            self.storage
                .write_file(&self.output_file(&filename), &data)
                .await?;
            tracing::debug!("💾 Wrote {} ({} bytes)", filename, data.len());
            rendered.push((filename, data));
        }

        if self.config.bundle_enabled() {
            let bundle_name = names
                .bundle
                .unwrap_or_else(|| DEFAULT_BUNDLE_FILENAME.to_string());
            let zip_data = render_bundle(&rendered)?;
            tracing::debug!("📦 Writing bundle ({} bytes)", zip_data.len());
            self.storage
                .write_file(&self.output_file(&bundle_name), &zip_data)
                .await?;
            return Ok(self.output_file(&bundle_name));
        }

        let first = rendered
            .first()
            .map(|(name, _)| name.clone())
            .ok_or_else(|| MixerError::MissingConfigError {
                field: "output_formats".to_string(),
            })?;
        Ok(self.output_file(&first))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OutputFilenames, PoolRole, PoolSpec};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const IPHONE_1: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15";
    const IPHONE_2: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_7 like Mac OS X) AppleWebKit/605.1.15";
    const IPHONE_3: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_8 like Mac OS X) AppleWebKit/605.1.15";
    const SAMSUNG_1: &str = "Mozilla/5.0 (Linux; Android 14; SM-S918B) AppleWebKit/537.36 Chrome/120.0";
    const MOTO_1: &str = "Mozilla/5.0 (Linux; Android 13; moto g54 5G) AppleWebKit/537.36 Chrome/119.0";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                MixerError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        pools: Vec<PoolSpec>,
        primary: String,
        formats: Vec<String>,
        bundle: bool,
        seed: bool,
    }

    impl MockConfig {
        fn new(pools: Vec<(&str, Vec<&str>)>) -> Self {
            Self {
                pools: pools
                    .into_iter()
                    .map(|(name, sources)| PoolSpec {
                        name: name.to_string(),
                        sources: sources.iter().map(|s| s.to_string()).collect(),
                    })
                    .collect(),
                primary: "iphone".to_string(),
                formats: vec!["txt".to_string(), "csv".to_string()],
                bundle: false,
                seed: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn pools(&self) -> &[PoolSpec] {
            &self.pools
        }

        fn primary_name(&self) -> &str {
            &self.primary
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn bundle_enabled(&self) -> bool {
            self.bundle
        }

        fn filenames(&self) -> OutputFilenames {
            OutputFilenames::default()
        }

        fn seed_default_pools(&self) -> bool {
            self.seed
        }

        fn start_cursor(&self) -> usize {
            0
        }
    }

    #[test]
    fn test_decode_txt_and_csv_sources() {
        let txt = decode_source("a.TXT", b"one\r\ntwo\n\nthree").unwrap();
        assert_eq!(txt, vec!["one", "two", "", "three"]);

        let csv = decode_source("a.csv", b"x,,y\n  \nz\n").unwrap();
        assert_eq!(csv, vec!["x", "y", "z"]);

        assert!(matches!(
            decode_source("a.xlsx", b""),
            Err(MixerError::UnsupportedSource { .. })
        ));
    }

    #[test]
    fn test_decode_strips_byte_order_mark() {
        let txt = format!("\u{feff}{}\n{}\n", IPHONE_1, IPHONE_1);
        let lines = decode_source("a.txt", txt.as_bytes()).unwrap();
        assert_eq!(lines[0], IPHONE_1);
        assert_eq!(crate::core::sanitizer::sanitize(&lines), vec![IPHONE_1]);

        let csv = format!("\u{feff}\"{}\",\"{}\"\n", IPHONE_2, IPHONE_2.to_lowercase());
        let cells = decode_source("a.csv", csv.as_bytes()).unwrap();
        assert_eq!(cells[0], IPHONE_2);
        assert_eq!(crate::core::sanitizer::sanitize(&cells), vec![IPHONE_2]);
    }

    #[tokio::test]
    async fn test_extract_reads_every_source_in_order() {
        let storage = MockStorage::new();
        storage.put("iphone.txt", &format!("{}\n", IPHONE_1)).await;
        storage.put("more.csv", &format!("\"{}\",junk\n", IPHONE_2)).await;
        let config = MockConfig::new(vec![("iPhone", vec!["iphone.txt", "more.csv"])]);
        let pipeline = MixPipeline::new(storage, config);

        let sources = pipeline.extract().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "iPhone");
        assert_eq!(sources[0].lines, vec![IPHONE_1, IPHONE_2, "junk"]);
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let config = MockConfig::new(vec![("iPhone", vec!["missing.txt"])]);
        let pipeline = MixPipeline::new(MockStorage::new(), config);
        assert!(matches!(
            pipeline.extract().await,
            Err(MixerError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_sanitizes_and_interleaves() {
        let config = MockConfig::new(vec![]);
        let pipeline = MixPipeline::new(MockStorage::new(), config);

        let sources = vec![
            PoolSource {
                name: "Samsung".to_string(),
                lines: vec![SAMSUNG_1.to_string(), SAMSUNG_1.to_lowercase()],
            },
            PoolSource {
                name: "iPhone".to_string(),
                lines: vec![
                    IPHONE_1.to_string(),
                    "short".to_string(),
                    IPHONE_2.to_string(),
                    IPHONE_3.to_string(),
                ],
            },
        ];

        let outcome = pipeline.transform(sources).await.unwrap();
        assert_eq!(outcome.mixed, vec![IPHONE_1, IPHONE_2, SAMSUNG_1, IPHONE_3]);
        assert_eq!(outcome.primary, "iphone");
        assert_eq!(outcome.pools[0].role, PoolRole::Secondary);
        assert_eq!(outcome.pools[1].role, PoolRole::Primary);
        assert_eq!(outcome.pools[1].records, 3);
    }

    #[tokio::test]
    async fn test_transform_merges_into_seeded_pools() {
        let mut config = MockConfig::new(vec![]);
        config.seed = true;
        let pipeline = MixPipeline::new(MockStorage::new(), config);

        let sources = vec![
            PoolSource {
                name: "IPHONE".to_string(),
                lines: vec![IPHONE_1.to_string()],
            },
            PoolSource {
                name: "motorola".to_string(),
                lines: vec![MOTO_1.to_string()],
            },
        ];

        let outcome = pipeline.transform(sources).await.unwrap();
        let names: Vec<&str> = outcome.pools.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["iPhone", "Samsung", "Motorola"]);
        assert_eq!(outcome.pools[1].role, PoolRole::Skipped);
        assert_eq!(outcome.mixed, vec![IPHONE_1, MOTO_1]);
    }

    #[test]
    fn test_merge_counts_against_existing_records() {
        let mut registry = PoolRegistry::new();
        let first = PoolSource {
            name: "iPhone".to_string(),
            lines: vec![IPHONE_1.to_string(), IPHONE_2.to_string(), "short".to_string()],
        };
        assert_eq!(merge_source(&mut registry, &first).unwrap(), (2, 1));

        // 已有兩筆：只新增 IPHONE_3，另外兩行是重複
        let second = PoolSource {
            name: "IPHONE".to_string(),
            lines: vec![
                IPHONE_1.to_lowercase(),
                IPHONE_3.to_string(),
                IPHONE_2.to_string(),
            ],
        };
        assert_eq!(merge_source(&mut registry, &second).unwrap(), (1, 2));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.total_records(), 3);
    }

    #[tokio::test]
    async fn test_transform_without_primary_fails() {
        let pipeline = MixPipeline::new(MockStorage::new(), MockConfig::new(vec![]));
        let sources = vec![PoolSource {
            name: "Samsung".to_string(),
            lines: vec![SAMSUNG_1.to_string()],
        }];
        assert!(matches!(
            pipeline.transform(sources).await,
            Err(MixerError::EmptyPrimary { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_writes_each_format() {
        let storage = MockStorage::new();
        let pipeline = MixPipeline::new(storage.clone(), MockConfig::new(vec![]));
        let outcome = MixOutcome {
            primary: "iphone".to_string(),
            pools: vec![],
            mixed: vec![IPHONE_1.to_string(), SAMSUNG_1.to_string()],
        };

        let output_path = pipeline.load(outcome).await.unwrap();
        assert_eq!(output_path, "test_output/mixed-user-agents.txt");

        let txt = storage
            .get_file("test_output/mixed-user-agents.txt")
            .await
            .unwrap();
        assert_eq!(txt, format!("{}\n{}", IPHONE_1, SAMSUNG_1).into_bytes());

        let csv = storage
            .get_file("test_output/mixed-user-agents.csv")
            .await
            .unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("user_agent\n"));
    }

    #[tokio::test]
    async fn test_load_with_bundle() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(vec![]);
        config.bundle = true;
        config.formats.push("json".to_string());
        let pipeline = MixPipeline::new(storage.clone(), config);
        let outcome = MixOutcome {
            primary: "iphone".to_string(),
            pools: vec![],
            mixed: vec![IPHONE_1.to_string()],
        };

        let output_path = pipeline.load(outcome).await.unwrap();
        assert_eq!(output_path, "test_output/mixed-user-agents.zip");

        let zip_bytes = storage.get_file(&output_path).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut file_names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        file_names.sort();

        assert_eq!(
            file_names,
            vec!["mix-report.json", "mixed-user-agents.csv", "mixed-user-agents.txt"]
        );
    }
}
