//! End-to-end runs of the msmt_5tt algorithm through the dwi2response driver
//!
//! MRtrix3 tools are scripted; the scratch directory lives in memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use msmt_core::application::{
    DriverOptions, Dwi2Response, GradientImport, Msmt5tt, Msmt5ttOptions, Session,
};
use msmt_core::domain::{LmaxList, Shell, Thresholds, Tissue, WmAlgorithm};
use msmt_core::port::command_runner::mocks::{Rule, ScriptedRunner};
use msmt_core::port::id_provider::StaticIdProvider;
use msmt_core::port::time_provider::FixedTimeProvider;
use msmt_core::port::workspace::mocks::MemoryWorkspace;
use msmt_core::AppError;

fn algorithm_options() -> Msmt5ttOptions {
    Msmt5ttOptions {
        in_5tt: PathBuf::from("/data/sub-01/anat/5tt.mif"),
        out_gm: PathBuf::from("/results/sub-01/gm.txt"),
        out_wm: PathBuf::from("/results/sub-01/wm.txt"),
        out_csf: PathBuf::from("/results/sub-01/csf.txt"),
        dirs: None,
        thresholds: Thresholds::default(),
        wm_algo: WmAlgorithm::default(),
    }
}

fn driver_options() -> DriverOptions {
    DriverOptions {
        input: PathBuf::from("/data/sub-01/dwi/dwi.mif"),
        ..Default::default()
    }
}

/// Tools behaving like a b=0,700,2000 acquisition
fn scripted_tools(ws: Arc<MemoryWorkspace>) -> Arc<ScriptedRunner> {
    let runner = Arc::new(ScriptedRunner::with_workspace(ws));
    runner
        .rule(Rule::new("mrinfo dwi.mif -size").stdout("112 112 70 97"))
        .rule(Rule::new("mrinfo mask.mif -size").stdout("112 112 70"))
        .rule(Rule::new("mrinfo 5tt.mif -size").stdout("112 112 70 5"))
        .rule(Rule::new("mrinfo 5tt.mif -datatype").stdout("Float32LE"))
        .rule(Rule::new("mrinfo dwi.mif -shells").stdout("5 700 2000"))
        .rule(Rule::new("tensor2metric").creates("vector.mif", "v1"))
        .rule(Rule::new("mrstats gm_mask.mif -output count").stdout("2048"))
        .rule(Rule::new("mrstats wm_sf_mask.mif -output count").stdout("512"))
        .rule(Rule::new("mrstats csf_mask.mif -output count").stdout("1024"))
        .rule(Rule::new("mrinfo dwi_b5.mif -size").stdout("112 112 70 7"))
        .rule(Rule::new("mrinfo dwi_b700.mif -size").stdout("112 112 70 30"))
        .rule(Rule::new("mrinfo dwi_b2000.mif -size").stdout("112 112 70 60"))
        .rule(Rule::new("-output mean -mask gm_mask.mif").stdout("800"))
        .rule(Rule::new("-output mean -mask csf_mask.mif").stdout("2500"))
        .rule(Rule::new("wm_response_b5.txt").creates("wm_response_b5.txt", "# b=5\n3000\n"))
        .rule(Rule::new("wm_response_b700.txt").creates("wm_response_b700.txt", "2000 -600 120\n"))
        .rule(
            Rule::new("wm_response_b2000.txt")
                .creates("wm_response_b2000.txt", "1200 -700 250 -60\n"),
        )
        .rule(Rule::new("dwiextract dwi.mif dwi_shells.mif").creates("dwi_shells.mif", "subset"));
    runner
}

fn setup() -> (Arc<MemoryWorkspace>, Arc<ScriptedRunner>, Dwi2Response) {
    let ws = Arc::new(MemoryWorkspace::new());
    let runner = scripted_tools(ws.clone());
    let app = Dwi2Response::new(
        Session::new(runner.clone(), ws.clone()),
        Arc::new(StaticIdProvider("sub-01-run".to_string())),
        Arc::new(FixedTimeProvider(1_700_000_000_000)),
    );
    (ws, runner, app)
}

#[tokio::test]
async fn test_full_estimation_from_header_gradients() {
    let (ws, runner, app) = setup();
    let algo = Msmt5tt::new(algorithm_options()).unwrap();

    let report = app.run(&algo, &driver_options()).await.unwrap();

    assert_eq!(report.run_id, "sub-01-run");
    assert_eq!(report.algorithm, "msmt_5tt");
    assert_eq!(report.responses.shells().len(), 3);
    assert_eq!(report.voxel_count(Tissue::Gm), Some(2048));
    assert_eq!(report.voxel_count(Tissue::Wm), Some(512));
    assert_eq!(report.voxel_count(Tissue::Csf), Some(1024));

    let wm = ws.exported(Path::new("/results/sub-01/wm.txt")).unwrap();
    assert_eq!(wm, "3000 0 0 0\n2000 -600 120 0\n1200 -700 250 -60\n");

    for tissue in [Tissue::Gm, Tissue::Csf] {
        let dest = match tissue {
            Tissue::Gm => "/results/sub-01/gm.txt",
            _ => "/results/sub-01/csf.txt",
        };
        let text = ws.exported(Path::new(dest)).unwrap();
        assert_eq!(text.lines().count(), 3, "{} response has one row per shell", tissue);
    }

    let history = runner.history();
    assert_eq!(history[0], "mrconvert /data/sub-01/dwi/dwi.mif dwi.mif -stride 0,0,0,1");
    assert_eq!(history[1], "dwi2mask dwi.mif mask.mif");
    assert_eq!(history[2], "mrconvert /data/sub-01/anat/5tt.mif 5tt.mif");
    assert!(history.last().unwrap().starts_with("mrcat"));

    // No user mask: only the DWI dimensions are checked
    assert!(runner.calls_matching("mrinfo mask.mif").is_empty());
}

#[tokio::test]
async fn test_report_serializes_outputs_in_tissue_order() {
    let (_ws, _runner, app) = setup();
    let algo = Msmt5tt::new(algorithm_options()).unwrap();

    let report = app.run(&algo, &driver_options()).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["run_id"], "sub-01-run");
    assert_eq!(
        json["outputs"],
        serde_json::json!([
            "/results/sub-01/gm.txt",
            "/results/sub-01/wm.txt",
            "/results/sub-01/csf.txt"
        ])
    );
}

#[tokio::test]
async fn test_shell_subset_with_lmax_and_voxels() {
    let (_ws, runner, app) = setup();
    runner.rule(Rule::new("mrinfo dwi.mif -shells").stdout("5 2000"));
    let algo = Msmt5tt::new(algorithm_options()).unwrap();
    let opts = DriverOptions {
        mask: Some(PathBuf::from("/data/sub-01/dwi/mask.mif")),
        grad: GradientImport::Mrtrix(PathBuf::from("/data/sub-01/dwi/grad.b")),
        shells: Some(vec![Shell::new(0.0), Shell::new(2000.0)]),
        lmax: Some(LmaxList::parse("0,8").unwrap()),
        voxels: Some(PathBuf::from("/results/sub-01/voxels.mif")),
        ..driver_options()
    };

    let report = app.run(&algo, &opts).await.unwrap();

    assert_eq!(report.responses.shells().len(), 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.outputs.len(), 4);
    assert_eq!(report.outputs[3], PathBuf::from("/results/sub-01/voxels.mif"));

    assert_eq!(
        runner.calls_matching("dwi_shells.mif"),
        vec!["dwiextract dwi.mif dwi_shells.mif -shell 0,2000"]
    );
    assert_eq!(
        runner.calls_matching("dwiextract dwi.mif -shell"),
        vec![
            "dwiextract dwi.mif -shell 5 dwi_b5.mif",
            "dwiextract dwi.mif -shell 2000 dwi_b2000.mif",
        ]
    );
    let sh2response = runner.calls_matching("sh2response");
    assert!(sh2response[0].ends_with("-lmax 0"));
    assert!(sh2response[1].ends_with("-lmax 8"));
    assert_eq!(
        runner.history().last().unwrap(),
        "mrconvert voxels.mif /results/sub-01/voxels.mif"
    );
}

#[tokio::test]
async fn test_existing_output_requires_force() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().join("wm.txt");
    std::fs::write(&existing, "old response\n").unwrap();

    let (_ws, runner, app) = setup();
    let mut opts = algorithm_options();
    opts.out_wm = existing.clone();
    let algo = Msmt5tt::new(opts).unwrap();

    let err = app.run(&algo, &driver_options()).await.unwrap_err();
    assert!(matches!(err, AppError::OutputExists(ref p) if *p == existing));
    assert!(runner.history().is_empty());

    let forced = DriverOptions {
        force: true,
        ..driver_options()
    };
    app.run(&algo, &forced).await.unwrap();
}

#[tokio::test]
async fn test_failed_tool_reports_command_and_stderr() {
    let (ws, runner, app) = setup();
    runner.rule(Rule::new("mrtransform").exit_code(1));
    let algo = Msmt5tt::new(algorithm_options()).unwrap();

    let err = app.run(&algo, &driver_options()).await.unwrap_err();

    match err {
        AppError::CommandFailed { command, exit_code, .. } => {
            assert!(command.starts_with("mrtransform 5tt.mif"));
            assert_eq!(exit_code, Some(1));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(ws.exported(Path::new("/results/sub-01/gm.txt")).is_none());
}
