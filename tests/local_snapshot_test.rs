use anyhow::Result;
use eco_atlas::domain::model::SnapshotBody;
use eco_atlas::{AtlasEngine, EngineConfig, IndicatorCode};
use std::path::Path;
use tempfile::TempDir;

fn write_json(root: &Path, relative: &str, value: serde_json::Value) -> Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec_pretty(&value)?)?;
    Ok(())
}

fn fact(code: &str, value: f64, world: f64) -> serde_json::Value {
    serde_json::json!({"code": code, "value": value, "pctl": {"world": world}})
}

/// `data/v1/index.json` plus one narrative per country, GBR truncated.
fn seed_snapshot(root: &Path) -> Result<()> {
    write_json(
        root,
        "data/v1/index.json",
        serde_json::json!({"countries": [
            {"iso3": "ARM", "name": "Armenia", "files": {"narrative": "/data/v1/countries/ARM_narrative.json"}},
            {"iso3": "AZE", "name": "Azerbaijan", "files": {"narrative": "/data/v1/countries/AZE_narrative.json"}},
            {"iso3": "GEO", "name": "Georgia", "files": {"narrative": "/data/v1/countries/GEO_narrative.json"}},
            {"iso3": "GBR", "name": "United Kingdom", "files": {"narrative": "/data/v1/countries/GBR_narrative.json"}}
        ]}),
    )?;

    write_json(
        root,
        "data/v1/countries/ARM_narrative.json",
        serde_json::json!({
            "iso3": "ARM", "country_name": "Armenia", "snapshot_date": "2025-05-31",
            "facts_used": [fact("SL.UEM.TOTL.ZS", 12.6, 20.0), fact("FP.CPI.TOTL.ZG", 2.0, 70.0)]
        }),
    )?;
    write_json(
        root,
        "data/v1/countries/AZE_narrative.json",
        serde_json::json!({
            "iso3": "AZE", "country_name": "Azerbaijan", "snapshot_date": "2025-06-30",
            "facts_used": [fact("SL.UEM.TOTL.ZS", 5.6, 55.0), fact("FP.CPI.TOTL.ZG", 9.0, 15.0)]
        }),
    )?;
    write_json(
        root,
        "data/v1/countries/GEO_narrative.json",
        serde_json::json!({
            "iso3": "GEO", "country_name": "Georgia", "snapshot_date": "2025-06-30",
            "facts_used": [fact("SL.UEM.TOTL.ZS", 11.6, 25.0)]
        }),
    )?;
    std::fs::write(root.join("data/v1/countries/GBR_narrative.json"), "{ truncated")?;
    Ok(())
}

fn engine_for(root: &Path) -> Result<AtlasEngine<eco_atlas::SnapshotSource>> {
    let config_path = root.join("atlas.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[source]
type = "local"
data_dir = "{}"
manifest_path = "data/v1/index.json"
countries_dir = "data/v1/countries"

[graph]
node_limit = 10

[logging]
level = "debug"
"#,
            root.display().to_string().replace('\\', "/")
        ),
    )?;

    let config = EngineConfig::from_file(&config_path)?;
    assert_eq!(config.logging.level, "debug");
    // every test in this binary shares one global subscriber
    let _ = config.logging.init();
    Ok(AtlasEngine::from_config(&config)?)
}

#[tokio::test]
async fn test_local_snapshot_loads_and_drops_broken_document() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_snapshot(temp_dir.path())?;
    let engine = engine_for(temp_dir.path())?;

    let countries = engine.countries().await?;
    let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Armenia", "Azerbaijan", "Georgia"]);
    Ok(())
}

#[tokio::test]
async fn test_distribution_highlights_lowest_unemployment() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_snapshot(temp_dir.path())?;
    let engine = engine_for(temp_dir.path())?;

    let summary = engine
        .distribution(IndicatorCode::Unemployment)
        .await?
        .expect("unemployment present");
    assert_eq!(summary.min, 5.6);
    assert_eq!(summary.max, 12.6);
    let highlighted: Vec<&str> = summary.highlights.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(highlighted, vec!["AZE", "GEO", "ARM"]);

    assert!(engine.distribution(IndicatorCode::LifeExpectancy).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_context_snapshots_from_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_snapshot(temp_dir.path())?;
    let engine = engine_for(temp_dir.path())?;

    let snapshots = engine.context_snapshots(&["CAUC", "UK", "ATLANTIS"]).await;

    let caucasus = snapshots["CAUC"].as_ref().expect("caucasus snapshot");
    assert_eq!(caucasus.count, 3);
    assert_eq!(caucasus.as_of_text.as_deref(), Some("2025-05-31 - 2025-06-30"));
    match &caucasus.body {
        SnapshotBody::Aggregated(items) => {
            let median_of = |code: IndicatorCode| items.iter().find(|i| i.code == code).and_then(|i| i.median);
            assert_eq!(median_of(IndicatorCode::Unemployment), Some(11.6));
            // two of three members report inflation, enough for a small group
            assert_eq!(median_of(IndicatorCode::Inflation), Some(5.5));
            assert_eq!(median_of(IndicatorCode::GdpPerCapita), None);
        }
        other => panic!("expected aggregated body, got {:?}", other),
    }

    let uk = snapshots["UK"].as_ref().expect("uk snapshot");
    assert!(matches!(uk.body, SnapshotBody::Qualitative(_)));
    assert_eq!(uk.as_of_text, None);

    assert!(snapshots["ATLANTIS"].is_none());
    Ok(())
}

#[tokio::test]
async fn test_unemployment_network_anchors_on_lowest_rate() -> Result<()> {
    let temp_dir = TempDir::new()?;
    seed_snapshot(temp_dir.path())?;
    let engine = engine_for(temp_dir.path())?;

    let graph = engine.network(IndicatorCode::Unemployment).await?;
    let weights: Vec<(&str, f64)> = graph.nodes.iter().map(|n| (n.id.as_str(), n.weight)).collect();
    assert_eq!(
        weights,
        vec![("AZE", 1.0), ("GEO", 5.6 / 11.6), ("ARM", 5.6 / 12.6)]
    );
    assert_ne!(graph.nodes[0].color, graph.nodes[2].color);
    Ok(())
}

fn documented_layout_engine(web_root: &Path, with_root_dir: bool) -> Result<AtlasEngine<eco_atlas::SnapshotSource>> {
    let web_root = web_root.display().to_string().replace('\\', "/");
    let root_line = if with_root_dir {
        format!("root_dir = \"{}\"\n", web_root)
    } else {
        String::new()
    };
    let config = EngineConfig::from_toml_str(&format!(
        "[source]\ntype = \"local\"\ndata_dir = \"{}/data/v1\"\nmanifest_path = \"index.json\"\n{}",
        web_root, root_line
    ))?;
    Ok(AtlasEngine::from_config(&config)?)
}

#[tokio::test]
async fn test_data_dir_at_snapshot_root_reads_web_rooted_manifest() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let web_root = temp_dir.path().join("public");
    seed_snapshot(&web_root)?;

    for with_root_dir in [false, true] {
        let engine = documented_layout_engine(&web_root, with_root_dir)?;
        let countries = engine.countries().await?;
        let codes: Vec<&str> = countries.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["ARM", "AZE", "GEO"], "root_dir set: {}", with_root_dir);
    }
    Ok(())
}
