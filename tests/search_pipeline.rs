//! End-to-end pipeline tests: generated shard files on disk through to
//! presentation rows.

use std::sync::Arc;

use symsearch::{
    FsShardSource, MatchConfig, ResultRow, ShardFormat, ShardMatcher, ShardStore, SymsearchConfig,
    run_query,
};

const MESH_SHARD: &str = "var searchData=\n[\n\
  ['makemesh_420',['MakeMesh',['../namespacelf.html#a1',1,'lf::MakeMesh']]],\n\
  ['mesh_394',['Mesh',['../classlf_1_1mesh_1_1_mesh.html',1,'lf::mesh::Mesh'],['../classlf_1_1mesh_1_1hybrid2d_1_1_mesh.html',1,'lf::mesh::hybrid2d::Mesh']]],\n\
  ['meshfactory_402',['MeshFactory',['../classlf_1_1mesh_1_1hybrid2d_1_1_mesh_factory.html',1,'lf::mesh::hybrid2d::MeshFactory']]],\n\
  ['meshhierarchy_413',['MeshHierarchy',['../classlf_1_1refinement_1_1_mesh_hierarchy.html',1,'lf::refinement::MeshHierarchy']]]\n\
];\n";

fn doxygen_matcher(dir: &std::path::Path) -> ShardMatcher {
    let store = ShardStore::new(Box::new(FsShardSource::new(dir)));
    ShardMatcher::new(Arc::new(store))
}

#[tokio::test]
async fn mesh_query_over_doxygen_shard_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("all_m.js"), MESH_SHARD).expect("write shard");

    let matcher = doxygen_matcher(dir.path());
    let rows = run_query(&matcher, "mesh", &MatchConfig::default())
        .await
        .expect("query");

    let labels: Vec<&str> = rows.iter().map(|r| r.label()).collect();
    assert_eq!(labels, vec!["Mesh", "MeshFactory", "MeshHierarchy", "MakeMesh"]);

    // "Mesh" resolves to two pages (an overload across namespaces), so it
    // is a menu row; the rest are direct rows.
    assert!(matches!(rows[0], ResultRow::Menu { .. }));
    assert!(matches!(rows[1], ResultRow::Direct { .. }));
}

#[tokio::test]
async fn limit_bounds_the_row_count_not_the_scan() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("all_m.js"), MESH_SHARD).expect("write shard");

    let matcher = doxygen_matcher(dir.path());
    let config = MatchConfig { max_results: 2 };
    let rows = run_query(&matcher, "mesh", &config).await.expect("query");

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label(), "Mesh");
    assert_eq!(rows[1].label(), "MeshFactory");
}

#[tokio::test]
async fn shard_is_loaded_once_and_cached() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("all_m.js");
    std::fs::write(&path, MESH_SHARD).expect("write shard");

    let matcher = doxygen_matcher(dir.path());
    let first = run_query(&matcher, "mesh", &MatchConfig::default())
        .await
        .expect("query");

    // Deleting the file behind the cache proves later queries never
    // touch the filesystem again.
    std::fs::remove_file(&path).expect("remove shard");
    let second = run_query(&matcher, "meshf", &MatchConfig::default())
        .await
        .expect("query");

    assert_eq!(first.len(), 4);
    assert_eq!(second.len(), 1);
    assert_eq!(matcher.store().cached_shards(), 1);
}

#[tokio::test]
async fn config_built_store_serves_json_shards() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json = serde_json::json!([
        { "label": "Mesh", "id": 394,
          "targets": [{ "title": "lf::mesh::Mesh", "anchor": "mesh.html" }] },
        { "label": "MeshFactory", "id": 402,
          "targets": [{ "title": "lf::mesh::MeshFactory", "anchor": "mf.html" }] }
    ]);
    std::fs::write(dir.path().join("symbols_m.json"), json.to_string()).expect("write shard");

    let yaml = format!(
        "version: \"1.0\"\nindex:\n  dir: \"{}\"\n  stem: \"symbols\"\n  format: \"json\"\n",
        dir.path().display()
    );
    let config = SymsearchConfig::from_yaml_str(&yaml).expect("config");
    let matcher = ShardMatcher::new(config.build_store());

    let rows = run_query(&matcher, "  MESH\t", &config.match_)
        .await
        .expect("query");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label(), "Mesh");
}

#[tokio::test]
async fn queries_against_absent_shards_stay_quiet() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("all_m.js"), MESH_SHARD).expect("write shard");

    let matcher = doxygen_matcher(dir.path());
    for raw in ["xyz123", "42", "::operator", "§"] {
        let rows = run_query(&matcher, raw, &MatchConfig::default())
            .await
            .expect("query");
        assert!(rows.is_empty(), "expected no rows for {raw:?}");
    }
}

#[tokio::test]
async fn format_mismatch_detected_by_extension() {
    // A JSON-configured source must not pick up the doxygen .js files.
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("all_m.js"), MESH_SHARD).expect("write shard");

    let store = ShardStore::new(Box::new(
        FsShardSource::new(dir.path()).with_format(ShardFormat::Json),
    ));
    let matcher = ShardMatcher::new(Arc::new(store));
    let rows = run_query(&matcher, "mesh", &MatchConfig::default())
        .await
        .expect("query");
    assert!(rows.is_empty());
}
