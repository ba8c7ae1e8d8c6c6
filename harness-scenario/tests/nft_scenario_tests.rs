//! The NFT scenario on the devnet, and on a live network when asked for.

use harness_config::{logging, HarnessConfig};
use harness_devnet::Devnet;
use harness_scenario::{NftScenario, ScenarioError, StepOutcome};
use harness_sdk::{ClientSession, ContractArtifact, SessionOptions};
use harness_wallet::Keypair;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn repo_path(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(relative)
}

fn devnet_session(devnet: &Devnet, seed: u8) -> ClientSession {
    ClientSession::new(
        Keypair::from_seed(&[seed; 32]),
        devnet.node_api(),
        devnet.compiler_api(),
        SessionOptions {
            network_id: devnet.node().network_id().to_string(),
            poll_interval: Duration::from_millis(1),
            ..SessionOptions::default()
        },
    )
}

fn devnet_scenario(devnet: &Devnet) -> NftScenario {
    NftScenario::load(
        devnet_session(devnet, 1),
        devnet_session(devnet, 2),
        &repo_path("contracts"),
    )
    .unwrap()
}

#[tokio::test]
async fn seed_scenario_passes_on_devnet() {
    logging::init_for_tests();
    let devnet = Devnet::new("ae_devnet");
    let report = devnet_scenario(&devnet).seed().await.unwrap();
    assert!(report.is_success(), "{report}");
    assert_eq!(report.steps.len(), 9);
}

#[tokio::test]
async fn property_checks_pass_on_devnet() {
    logging::init_for_tests();
    let devnet = Devnet::new("ae_devnet");
    let report = devnet_scenario(&devnet).properties().await.unwrap();
    assert!(report.is_success(), "{report}");
}

#[tokio::test]
async fn full_run_reports_both_scenarios() {
    let devnet = Devnet::new("ae_devnet");
    let reports = devnet_scenario(&devnet).run().await.unwrap();
    let names: Vec<&str> = reports.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["nft seed", "nft properties"]);
    for report in reports {
        report.into_result().unwrap();
    }
}

#[tokio::test]
async fn seed_runs_again_on_a_fresh_deployment() {
    let devnet = Devnet::new("ae_devnet");
    let scenario = devnet_scenario(&devnet);
    let first = scenario.seed().await.unwrap();
    let second = scenario.seed().await.unwrap();
    assert!(first.is_success(), "{first}");
    assert!(second.is_success(), "{second}");
}

const INERT_NFT: &str = "contract InertNFT =
  record state = { name : string }
  entrypoint init(name : string, symbol : string) = { name = name }
  entrypoint name() : string = state.name
  entrypoint symbol() : string = \"\"
  entrypoint owner_of(token_id : int) : address = Call.caller
  entrypoint balance_of(owner : address) : int = 0
  entrypoint get_approved(token_id : int) : option(address) = None
  entrypoint is_approved_for_all(owner : address, operator : address) : bool = false
  stateful entrypoint mint(to : address, token_id : int) : unit = ()
  stateful entrypoint approve(approved : address, token_id : int) : unit = ()
  stateful entrypoint set_approval_for_all(operator : address, approved : bool) : unit = ()
  stateful entrypoint transfer_from(from : address, to : address, token_id : int) : unit = ()
  stateful entrypoint safe_transfer_from(from : address, to : address, token_id : int, data : string) : unit = ()
  stateful entrypoint burn(token_id : int) : unit = ()
";

#[tokio::test]
async fn failing_step_skips_the_rest() {
    let devnet = Devnet::new("ae_devnet");
    let receiver = ContractArtifact::load(repo_path("contracts/ExampleContract.aes")).unwrap();
    let scenario = NftScenario::new(
        devnet_session(&devnet, 1),
        devnet_session(&devnet, 2),
        ContractArtifact::from_source(INERT_NFT, BTreeMap::new()),
        receiver,
    );

    let report = scenario.seed().await.unwrap();
    assert!(!report.is_success());
    assert_eq!(
        report.failure().unwrap().name,
        "metadata matches constructor arguments"
    );
    assert!(report.steps[1..]
        .iter()
        .all(|step| step.outcome == StepOutcome::Skipped));
    assert!(matches!(
        report.into_result(),
        Err(ScenarioError::StepFailed { .. })
    ));
}

#[tokio::test]
#[ignore = "needs a running node and compiler from config/network.json"]
async fn seed_scenario_passes_on_live_network() {
    logging::init_for_tests();
    let config = HarnessConfig::load(
        &repo_path("config/network.json"),
        &repo_path("config/wallets.json"),
    )
    .unwrap();
    let (name, network) = config.select_network().unwrap();
    let scenario = NftScenario::connect(&config, network, &repo_path("contracts")).unwrap();

    for report in scenario.run().await.unwrap() {
        assert!(report.is_success(), "{name}: {report}");
    }
}
