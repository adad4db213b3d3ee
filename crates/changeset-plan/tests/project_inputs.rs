use changeset_core::{BumpType, DependencyKind, PackageInfo};
use changeset_parse::parse_changeset;
use changeset_plan::{DependentsGraph, PlanConfig, assemble};
use changeset_project::ChangesetConfig;
use semver::Version;

fn workspace() -> Vec<PackageInfo> {
    vec![
        PackageInfo::new("core", Version::new(0, 4, 2)),
        PackageInfo::new("cli", Version::new(0, 4, 2))
            .with_dependency("core", "^0.4.2", DependencyKind::Regular),
        PackageInfo::new("plugin", Version::new(1, 1, 0))
            .with_dependency("core", "~0.4.0", DependencyKind::Peer)
            .with_dependency("serde", "^1", DependencyKind::Regular),
        PackageInfo::new("docs", Version::new(3, 0, 0))
            .with_dependency("cli", "*", DependencyKind::Dev),
    ]
}

#[test]
fn parsed_changesets_and_config_produce_a_plan() -> anyhow::Result<()> {
    let packages = workspace();
    let config = ChangesetConfig::parse(
        r#"
base-branch = "main"
linked = [["core", "cli"]]
"#,
        &packages,
    )?;
    let changesets = vec![
        parse_changeset(
            "brave-owls-sing",
            "---\n\"core\": minor\n---\n\nAdd streaming API.\n",
        )?,
        parse_changeset("quiet-lamps-glow", "---\ndocs: patch\n---\n\nFix typo.\n")?,
    ];
    let dependents = DependentsGraph::from_packages(&packages);

    let plan = assemble(
        &changesets,
        &packages,
        &dependents,
        &PlanConfig::from(&config),
    )?;

    let summary: Vec<_> = plan
        .releases
        .iter()
        .map(|r| (r.name.as_str(), r.bump_type, r.new_version.to_string()))
        .collect();
    assert_eq!(
        summary,
        [
            ("core", BumpType::Minor, "0.5.0".to_string()),
            ("cli", BumpType::Minor, "0.5.0".to_string()),
            ("docs", BumpType::Patch, "3.0.1".to_string()),
            ("plugin", BumpType::Major, "2.0.0".to_string()),
        ]
    );
    assert_eq!(
        plan.release("core").map(|r| r.changesets.as_slice()),
        Some(["brave-owls-sing".to_string()].as_slice())
    );
    assert!(plan.release("cli").is_some_and(|r| r.changesets.is_empty()));
    assert_eq!(plan.changesets.len(), 2);
    Ok(())
}

#[test]
fn default_config_has_no_linked_groups() -> anyhow::Result<()> {
    let packages = workspace();
    let changesets = vec![parse_changeset(
        "brave-owls-sing",
        "---\ncore: patch\n---\n\nFix.\n",
    )?];

    let plan = assemble(
        &changesets,
        &packages,
        &DependentsGraph::from_packages(&packages),
        &PlanConfig::from(&ChangesetConfig::default()),
    )?;

    let names: Vec<_> = plan.releases.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["core"]);
    Ok(())
}
