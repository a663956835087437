//! Integration tests for the booker CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Create a temp directory with a small roster.
fn test_roster() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("roster.json"),
        r#"{
    "factions": [{"name": "The Syndicate", "affinity": 90}],
    "wrestlers": [
        {"name": "Ace", "fans": 30000, "alignment": 3},
        {"name": "Brute", "fans": 45000, "alignment": -2, "faction": "The Syndicate"},
        {"name": "Cobra", "fans": 12000, "alignment": -4, "faction": "The Syndicate"},
        {"name": "Duke", "fans": 20000}
    ],
    "titles": [
        {"name": "Extreme Championship", "tier": "extreme", "champion": "Ace"},
        {"name": "World Championship", "tier": "world"}
    ],
    "rivalries": [{"a": "Ace", "b": "Brute", "heat": 12}],
    "referees": [{"name": "Earl", "awareness": 40}]
}
"#,
    )
    .unwrap();
    dir
}

fn booker(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("booker").unwrap();
    cmd.current_dir(dir.path()).env("NO_COLOR", "1");
    cmd
}

// -- tiers --

#[test]
fn tiers_prints_tables() {
    let dir = test_roster();
    booker(&dir)
        .arg("tiers")
        .assert()
        .success()
        .stdout(predicate::str::contains("Main Eventer"))
        .stdout(predicate::str::contains("Tag Team"))
        .stdout(predicate::str::contains("Explosive"))
        .stdout(predicate::str::contains("30+"));
}

// -- roster --

#[test]
fn roster_lists_wrestlers_and_titles() {
    let dir = test_roster();
    booker(&dir)
        .arg("roster")
        .assert()
        .success()
        .stdout(predicate::str::contains("Brute"))
        .stdout(predicate::str::contains("4 wrestlers"))
        .stdout(predicate::str::contains("Extreme Championship"))
        .stdout(predicate::str::contains("vacant"));
}

#[test]
fn missing_roster_fails() {
    let dir = TempDir::new().unwrap();
    booker(&dir)
        .args(["roster", "--roster", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn invalid_roster_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("roster.json"), "{ not json").unwrap();
    booker(&dir)
        .arg("roster")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid roster"));
}

// -- resolve --

#[test]
fn resolve_singles() {
    let dir = test_roster();
    booker(&dir)
        .args(["resolve", "Ace", "Duke"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Singles"))
        .stdout(predicate::str::contains("wins by"));
}

#[test]
fn resolve_json_report() {
    let dir = test_roster();
    let output = booker(&dir)
        .args(["resolve", "Ace", "Brute", "--json", "--stipulation", "Steel Cage"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"]["match_type"], "singles");
    assert_eq!(report["result"]["stipulation"]["name"], "Steel Cage");
    assert_eq!(report["team_power"].as_array().unwrap().len(), 2);
    let events = report["events"].as_array().unwrap();
    assert!(events.iter().any(|e| e["type"] == "heat_changed"));
}

#[test]
fn resolve_same_seed_is_deterministic() {
    let dir = test_roster();
    let run = || {
        booker(&dir)
            .args(["resolve", "Ace,Duke", "Brute,Cobra", "--json", "--seed", "7"])
            .output()
            .unwrap()
            .stdout
    };
    let first: serde_json::Value = serde_json::from_slice(&run()).unwrap();
    let second: serde_json::Value = serde_json::from_slice(&run()).unwrap();
    assert_eq!(first["result"]["winning_team"], second["result"]["winning_team"]);
    assert_eq!(first["result"]["match_type"], "tag_team");
}

#[test]
fn resolve_title_match_with_save() {
    let dir = test_roster();
    booker(&dir)
        .args([
            "resolve",
            "Ace",
            "Brute",
            "--title",
            "Extreme Championship",
            "--save",
        ])
        .assert()
        .success();
    let saved = fs::read_to_string(dir.path().join("roster.json")).unwrap();
    let roster: serde_json::Value = serde_json::from_str(&saved).unwrap();
    let title = roster["titles"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "Extreme Championship")
        .unwrap();
    let champion = title["champion"].as_str().unwrap();
    assert!(champion == "Ace" || champion == "Brute");
    assert_eq!(roster["wrestlers"].as_array().unwrap().len(), 4);
}

#[test]
fn resolve_unknown_wrestler_fails() {
    let dir = test_roster();
    booker(&dir)
        .args(["resolve", "Ace", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown wrestler 'Nobody'"));
}

#[test]
fn resolve_unknown_match_type_fails() {
    let dir = test_roster();
    booker(&dir)
        .args(["resolve", "Ace", "Duke", "--type", "cage_of_doom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown match type"));
}

#[test]
fn resolve_rejects_wrestler_on_both_sides() {
    let dir = test_roster();
    booker(&dir)
        .args(["resolve", "Ace", "Ace,Duke"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// -- interfere --

#[test]
fn interfere_then_resolve() {
    let dir = test_roster();
    booker(&dir)
        .args([
            "interfere",
            "Cobra",
            "Brute",
            "Ace",
            "--kind",
            "low_blow",
            "--referee",
            "Earl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ringside: Cobra"))
        .stdout(predicate::str::contains("awareness 0 ->"))
        .stdout(predicate::str::contains("wins by"));
}

#[test]
fn interfere_cheer_never_raises_awareness() {
    let dir = test_roster();
    booker(&dir)
        .args(["interfere", "Duke", "Ace", "Brute", "--kind", "cheer", "--attempts", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#3 cheer"))
        .stdout(predicate::str::contains("DQ").not());
}

#[test]
fn interfere_unknown_kind_fails() {
    let dir = test_roster();
    booker(&dir)
        .args(["interfere", "Cobra", "Brute", "Ace", "--kind", "chair_shot"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown interference type"));
}

// -- rivalries / heat --

#[test]
fn rivalries_lists_active_feuds() {
    let dir = test_roster();
    booker(&dir)
        .arg("rivalries")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ace vs Brute"))
        .stdout(predicate::str::contains("Heated"))
        .stdout(predicate::str::contains("match required"));
}

#[test]
fn rivalries_min_filter() {
    let dir = test_roster();
    booker(&dir)
        .args(["rivalries", "--min", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rivalries found"));
}

#[test]
fn heat_starts_new_rivalry_and_saves() {
    let dir = test_roster();
    booker(&dir)
        .args(["heat", "Cobra", "Duke", "25", "--reason", "Backstage brawl", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cobra vs Duke: heat +25 -> 25"))
        .stdout(predicate::str::contains("Intense"));

    booker(&dir)
        .arg("rivalries")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cobra vs Duke"));
}

#[test]
fn heat_cannot_drop_below_zero() {
    let dir = test_roster();
    booker(&dir)
        .args(["heat", "Ace", "Brute", "-40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-> 0"));
}

#[test]
fn heat_with_self_fails() {
    let dir = test_roster();
    booker(&dir)
        .args(["heat", "Ace", "ace", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot feud with themselves"));
}

// -- challenge --

#[test]
fn challenge_deducts_cost() {
    let dir = test_roster();
    booker(&dir)
        .args(["challenge", "Brute", "Extreme Championship", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paid 15000 fans, 30000 remaining"));
    let saved = fs::read_to_string(dir.path().join("roster.json")).unwrap();
    assert!(saved.contains("30000"));
}

#[test]
fn challenge_requires_fans() {
    let dir = test_roster();
    booker(&dir)
        .args(["challenge", "Duke", "World Championship"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn champion_cannot_challenge_own_title() {
    let dir = test_roster();
    booker(&dir)
        .args(["challenge", "Ace", "Extreme Championship"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already the champion"));
}

// -- campaign --

#[test]
fn campaign_runs_chapters() {
    let dir = test_roster();
    booker(&dir)
        .args(["campaign", "Ace", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Campaign: Ace"))
        .stdout(predicate::str::contains("Debut"))
        .stdout(predicate::str::contains("skill tokens"));
}

#[test]
fn campaign_unknown_wrestler_fails() {
    let dir = test_roster();
    booker(&dir)
        .args(["campaign", "Nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown wrestler"));
}

#[test]
fn campaign_with_custom_chapters() {
    let dir = test_roster();
    fs::write(
        dir.path().join("chapters.json"),
        r#"{"chapters": [{"id": "gauntlet", "title": "Gauntlet", "min_matches": 2}]}"#,
    )
    .unwrap();
    booker(&dir)
        .args(["campaign", "Duke", "--chapters", "chapters.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Gauntlet"))
        .stdout(predicate::str::contains("Completed"));
}

#[test]
fn campaign_rejects_invalid_chapters() {
    let dir = test_roster();
    fs::write(dir.path().join("chapters.json"), r#"{"chapters": []}"#).unwrap();
    booker(&dir)
        .args(["campaign", "Duke", "--chapters", "chapters.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn campaign_rejects_bracket_larger_than_finals() {
    let dir = test_roster();
    fs::write(
        dir.path().join("chapters.json"),
        r#"{"chapters": [{"id": "cup", "title": "Cup", "tournament": {"bracket_size": 8}}]}"#,
    )
    .unwrap();
    booker(&dir)
        .args(["campaign", "Duke", "--chapters", "chapters.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rounds"));
}
