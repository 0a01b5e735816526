// Integration tests for build orchestration
use kiln::compilers::CopyCompiler;
use kiln::{BuildEnv, BuildOptions, BundleSpec, Config};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{Duration, timeout};

fn write_file(temp: &TempDir, rel: &str, contents: &str) {
    let path = temp.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn one_shot(name: &str, bundles: Vec<BundleSpec>) -> BuildOptions {
    BuildOptions {
        name: name.to_string(),
        bundles,
        watch: Vec::new(),
        live_reload_channel: None,
        watch_mode: false,
        auto_exit: false,
        units: Vec::new(),
    }
}

#[tokio::test]
async fn one_shot_build_runs_every_bundle() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "pages/a.x", "alpha");
    write_file(&temp, "data/d.json", "{}");

    let env = Arc::new(BuildEnv::new(Config::default()));
    let bundles = vec![
        BundleSpec::new(
            format!("{}/pages/*.x", temp.path().display()),
            Arc::new(CopyCompiler),
        )
        .bundle_root(temp.path().join("pages"))
        .output_root(temp.path().join("out"))
        .ext(".y"),
        BundleSpec::new(
            format!("{}/data/*.json", temp.path().display()),
            Arc::new(CopyCompiler),
        )
        .bundle_root(temp.path().join("data"))
        .output_root(temp.path().join("out_data"))
        .ext(".json"),
    ];

    kiln::builder::build(env, one_shot("assets", bundles))
        .await
        .unwrap();

    assert_eq!(
        fs::read_to_string(temp.path().join("out/a.y")).unwrap(),
        "alpha"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("out_data/d.json")).unwrap(),
        "{}"
    );
}

#[tokio::test]
async fn live_reload_clients_hear_about_completed_passes() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "pages/a.x", "alpha");

    let config: Config = serde_json::from_value(json!({
        "live_reload": {"port": 0}
    }))
    .unwrap();
    let env = Arc::new(BuildEnv::new(config));

    let handle = env.live_reload.start().await.unwrap().clone();
    let stream = TcpStream::connect(handle.addr()).await.unwrap();
    let mut lines = BufReader::new(stream).lines();

    // the forwarder subscribes asynchronously after accept, so nudge until
    // a message makes it through
    loop {
        handle.refresh("warmup");
        match timeout(Duration::from_millis(20), lines.next_line()).await {
            Ok(line) => {
                assert!(line.unwrap().unwrap().contains("warmup"));
                break;
            }
            Err(_) => continue,
        }
    }
    // drain any warmup still in flight
    while let Ok(line) = timeout(Duration::from_millis(50), lines.next_line()).await {
        assert!(line.unwrap().unwrap().contains("warmup"));
    }

    let bundles = vec![
        BundleSpec::new(
            format!("{}/pages/*.x", temp.path().display()),
            Arc::new(CopyCompiler),
        )
        .bundle_root(temp.path().join("pages"))
        .output_root(temp.path().join("out"))
        .ext(".css"),
    ];
    let mut options = one_shot("styles", bundles);
    options.live_reload_channel = Some("all.css".to_string());

    kiln::builder::build(env.clone(), options).await.unwrap();

    let line = timeout(Duration::from_secs(5), lines.next_line())
        .await
        .expect("no refresh within 5s")
        .unwrap()
        .expect("connection closed");
    assert_eq!(line, r#"{"command":"reload","path":"all.css"}"#);
    assert!(temp.path().join("out/a.css").exists());
}

#[tokio::test]
async fn units_restrict_a_full_build() {
    let temp = TempDir::new().unwrap();
    write_file(&temp, "pages/home/home.x", "home");
    write_file(&temp, "pages/about/about.x", "about");

    let config: Config = serde_json::from_value(json!({
        "roots": {"pages": temp.path().join("pages")}
    }))
    .unwrap();
    let env = Arc::new(BuildEnv::new(config));

    let bundles = vec![
        BundleSpec::new(
            format!("{}/pages/**/*.x", temp.path().display()),
            Arc::new(CopyCompiler),
        )
        .bundle_root(temp.path().join("pages"))
        .output_root(temp.path().join("out"))
        .ext(".y"),
    ];
    let mut options = one_shot("assets", bundles);
    options.units = vec!["home".to_string()];

    kiln::builder::build(env, options).await.unwrap();

    assert!(temp.path().join("out/home/home.y").exists());
    assert!(!temp.path().join("out/about/about.y").exists());
}
