use std::path::Path;

use rolegraph::core::RolegraphError;
use rolegraph::inventory::{
    EntityDetails, EntityId, EntityKind, Inventory, InventoryBuilder, ProjectOutcome, SkipReason,
};
use rolegraph::test_utils::{MockHost, MockProject, init_test_logging, test_settings};

const WEBSERVER_META: &str = "galaxy_info:\n  description: Installs nginx\n";

async fn build(host: &MockHost, filters: &[&str]) -> Result<Inventory, RolegraphError> {
    init_test_logging(None);
    let settings = test_settings(filters, Path::new("."));
    InventoryBuilder::new(host, &settings).build().await
}

fn outcome<'a>(inventory: &'a Inventory, path: &str) -> &'a ProjectOutcome {
    &inventory.outcomes.iter().find(|(p, _)| p == path).unwrap().1
}

#[tokio::test]
async fn test_single_role_without_dependencies() {
    let host = MockHost::new().with_role(12, "infra/webserver", WEBSERVER_META);

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert_eq!(inventory.entities.len(), 1);
    let webserver = inventory.get("webserver-12").unwrap();
    assert_eq!(webserver.kind(), EntityKind::Role);
    assert!(webserver.used_by.is_empty());
    match &webserver.details {
        EntityDetails::Role { repository, description, .. } => {
            assert_eq!(description, "Installs nginx");
            assert_eq!(repository.group, "infra");
        }
        other => panic!("expected a role, got {other:?}"),
    }
    assert!(inventory.edges.is_empty());
    assert_eq!(inventory.placeholders, 0);
}

#[tokio::test]
async fn test_play_dependency_resolves_to_role() {
    let host = MockHost::new()
        .with_project(
            MockProject::new(12, "infra/webserver")
                .file("meta", "main.yml", WEBSERVER_META)
                .tags(&["v1.1.0", "v1.0.0"]),
        )
        .with_play(5, "ops/site", "- src: git@gitlab.example.com:infra/webserver.git\n");

    let inventory = build(&host, &["infra/", "ops/"]).await.unwrap();

    let site = EntityId::for_project("site", 5);
    assert_eq!(inventory.edges.len(), 1);
    assert_eq!(inventory.edges.get("infra/webserver").unwrap(), &[site.clone()][..]);

    let webserver = inventory.get("webserver-12").unwrap();
    assert_eq!(webserver.used_by, vec![site]);
    assert_eq!(webserver.repository().unwrap().git_tags, vec!["v1.1.0", "v1.0.0"]);
    assert_eq!(inventory.get("site-5").unwrap().kind(), EntityKind::Play);
    assert_eq!(*outcome(&inventory, "ops/site"), ProjectOutcome::Linked(EntityKind::Play));
}

#[tokio::test]
async fn test_dependency_on_later_project_still_resolves() {
    let host = MockHost::new()
        .with_play(5, "ops/site", "- src: git@gitlab.example.com:infra/webserver.git\n")
        .with_role(12, "infra/webserver", WEBSERVER_META);

    let inventory = build(&host, &["infra/", "ops/"]).await.unwrap();

    assert_eq!(inventory.get("webserver-12").unwrap().used_by, vec![EntityId::from("site-5")]);
    assert_eq!(inventory.placeholders, 0);
}

#[tokio::test]
async fn test_dependency_without_src_becomes_external_placeholder() {
    let host = MockHost::new().with_play(5, "ops/site", "- name: community.general\n");

    let inventory = build(&host, &["ops/"]).await.unwrap();

    assert_eq!(inventory.placeholders, 1);
    let external = inventory.get("zzz-unknown-0").unwrap();
    assert_eq!(external.name, "community.general");
    assert_eq!(external.kind(), EntityKind::RoleExternal);
    assert_eq!(external.used_by, vec![EntityId::from("site-5")]);
    assert_eq!(external.url(), "");
    assert_eq!(external.web_url(), "");
}

#[tokio::test]
async fn test_unmatched_src_becomes_unknown_placeholder() {
    let host = MockHost::new().with_play(
        5,
        "ops/site",
        "- src: git@gitlab.example.com:infra/removed.git\n- src: https://github.com/example/ansible-role-x.git\n",
    );

    let inventory = build(&host, &["ops/"]).await.unwrap();

    let unknown: Vec<_> = inventory.of_kind(EntityKind::RoleUnknown).collect();
    assert_eq!(unknown.len(), 2);
    assert_eq!(unknown[0].name, "infra/removed");
    assert_eq!(unknown[1].name, "https://github.com/example/ansible-role-x.git");
}

#[tokio::test]
async fn test_include_stops_linking() {
    let host = MockHost::new().with_play(
        5,
        "ops/site",
        "- include: ./other.yml\n- src: git@gitlab.example.com:infra/webserver.git\n",
    );

    let inventory = build(&host, &["ops/"]).await.unwrap();

    assert!(inventory.edges.is_empty());
    assert_eq!(inventory.entities.len(), 1);
    assert_eq!(*outcome(&inventory, "ops/site"), ProjectOutcome::Linked(EntityKind::Play));
}

#[tokio::test]
async fn test_edges_before_include_are_kept() {
    let host = MockHost::new().with_role(
        12,
        "infra/webserver",
        "dependencies:\n  - name: common\n  - include: ./more.yml\n  - name: never\n",
    );

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert_eq!(inventory.edges.len(), 1);
    assert!(inventory.edges.get("common").is_some());
    assert!(inventory.edges.get("never").is_none());
}

#[tokio::test]
async fn test_duplicate_dependency_is_recorded_once() {
    let host = MockHost::new()
        .with_role(12, "infra/webserver", WEBSERVER_META)
        .with_play(
            5,
            "ops/site",
            "- src: git@gitlab.example.com:infra/webserver.git\n- src: git@gitlab.example.com:infra/webserver.git\n  name: webserver\n",
        );

    let inventory = build(&host, &["infra/", "ops/"]).await.unwrap();

    assert_eq!(inventory.get("webserver-12").unwrap().used_by, vec![EntityId::from("site-5")]);
}

#[tokio::test]
async fn test_shared_target_is_one_placeholder() {
    let host = MockHost::new()
        .with_play(5, "ops/site", "- name: community.general\n")
        .with_play(6, "ops/backup", "- name: community.general\n");

    let inventory = build(&host, &["ops/"]).await.unwrap();

    assert_eq!(inventory.placeholders, 1);
    assert_eq!(
        inventory.get("zzz-unknown-0").unwrap().used_by,
        vec![EntityId::from("site-5"), EntityId::from("backup-6")]
    );
}

#[tokio::test]
async fn test_role_dependencies_link_roles() {
    let host = MockHost::new()
        .with_role(
            12,
            "infra/webserver",
            "dependencies:\n  - src: git@gitlab.example.com:infra/common.git\n",
        )
        .with_role(13, "infra/common", "galaxy_info: {}\ndependencies: []\n");

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert_eq!(inventory.get("common-13").unwrap().used_by, vec![EntityId::from("webserver-12")]);
}

#[tokio::test]
async fn test_archived_and_filtered_projects_are_skipped() {
    let host = MockHost::new()
        .with_project(
            MockProject::new(7, "infra/legacy").file("meta", "main.yml", WEBSERVER_META).archived(),
        )
        .with_role(8, "sandbox/experiment", WEBSERVER_META)
        .with_role(12, "infra/webserver", WEBSERVER_META);

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert_eq!(*outcome(&inventory, "infra/legacy"), ProjectOutcome::Archived);
    assert_eq!(*outcome(&inventory, "sandbox/experiment"), ProjectOutcome::FilteredOut);
    assert_eq!(inventory.entities.len(), 1);
    assert_eq!(host.blob_requests(), vec!["infra/webserver/meta/main.yml"]);
}

#[tokio::test]
async fn test_no_filters_process_nothing() {
    let host = MockHost::new().with_role(12, "infra/webserver", WEBSERVER_META);

    let inventory = build(&host, &[]).await.unwrap();

    assert!(inventory.entities.is_empty());
    assert_eq!(*outcome(&inventory, "infra/webserver"), ProjectOutcome::FilteredOut);
    assert!(host.blob_requests().is_empty());
}

#[tokio::test]
async fn test_symlinked_metadata_skips_project() {
    let host = MockHost::new().with_project(
        MockProject::new(12, "infra/webserver")
            .symlink("meta", "main.yml", "../../common/meta/main.yml")
            .file("roles", "requirements.yml", "- name: x\n"),
    );

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert!(inventory.entities.is_empty());
    assert_eq!(
        *outcome(&inventory, "infra/webserver"),
        ProjectOutcome::Skipped(SkipReason::Symlink {
            file: "meta/main.yml".to_string(),
            target: "../../common/meta/main.yml".to_string(),
        })
    );
    // no play attempt after a symlinked role file
    assert_eq!(host.blob_requests(), vec!["infra/webserver/meta/main.yml"]);
}

#[tokio::test]
async fn test_play_is_tried_only_without_role_metadata() {
    let host = MockHost::new()
        .with_project(MockProject::new(5, "ops/site").empty_dir("meta").file(
            "roles",
            "requirements.yml",
            "- name: community.general\n",
        ))
        .with_project(MockProject::new(6, "ops/empty").file("meta", "main.yml", "~\n"))
        .with_project(MockProject::new(7, "ops/nothing"))
        .with_project(MockProject::new(8, "ops/fresh").without_default_branch());

    let inventory = build(&host, &["ops/"]).await.unwrap();

    assert_eq!(*outcome(&inventory, "ops/site"), ProjectOutcome::Linked(EntityKind::Play));
    assert_eq!(*outcome(&inventory, "ops/empty"), ProjectOutcome::NoMetadata);
    assert_eq!(*outcome(&inventory, "ops/nothing"), ProjectOutcome::NoMetadata);
    assert_eq!(*outcome(&inventory, "ops/fresh"), ProjectOutcome::NoMetadata);
}

#[tokio::test]
async fn test_unreadable_blob_is_treated_as_absent() {
    let host = MockHost::new()
        .with_project(MockProject::new(12, "infra/webserver").unreadable("meta", "main.yml"));

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert_eq!(*outcome(&inventory, "infra/webserver"), ProjectOutcome::NoMetadata);
}

#[tokio::test]
async fn test_collection_style_requirements() {
    let host = MockHost::new().with_play(
        5,
        "ops/site",
        "roles:\n  - name: geerlingguy.nginx\ncollections:\n  - name: community.general\n",
    );

    let inventory = build(&host, &["ops/"]).await.unwrap();

    assert_eq!(inventory.edges.len(), 1);
    assert!(inventory.edges.get("geerlingguy.nginx").is_some());
}

#[tokio::test]
async fn test_listing_error_is_fatal_with_exit_255() {
    let host = MockHost::new()
        .with_project(MockProject::new(12, "infra/webserver").failing_dir("meta", 500));

    let err = build(&host, &["infra/"]).await.unwrap_err();

    assert!(matches!(err, RolegraphError::TreeListingFailed { ref path, .. } if path == "meta"));
    assert_eq!(err.exit_code(), 255);
}

#[tokio::test]
async fn test_malformed_path_is_fatal() {
    let host = MockHost::new().with_role(12, "webserver", WEBSERVER_META);

    let err = build(&host, &["web"]).await.unwrap_err();

    assert!(matches!(err, RolegraphError::MalformedProjectPath { .. }));
}

#[tokio::test]
async fn test_unparseable_metadata_is_fatal() {
    let host = MockHost::new()
        .with_role(12, "infra/webserver", "galaxy_info: [unclosed\n")
        .with_role(13, "infra/broken", "dependencies:\n  - version: 1.0.0\n");

    let err = build(&host, &["infra/webserver"]).await.unwrap_err();
    assert!(matches!(err, RolegraphError::InvalidMetadata { .. }));

    let err = build(&host, &["infra/broken"]).await.unwrap_err();
    assert!(matches!(err, RolegraphError::InvalidMetadata { ref file, .. } if file == "meta/main.yml"));
}

#[tokio::test]
async fn test_mistyped_galaxy_fields_do_not_abort() {
    let host = MockHost::new()
        .with_role(
            12,
            "infra/webserver",
            "galaxy_info:\n  description: Installs nginx\n  galaxy_tags: web\n",
        )
        .with_role(
            13,
            "infra/database",
            "galaxy_info:\n  description: [not, a, string]\n  platforms: {name: EL}\n",
        )
        .with_role(14, "infra/cache", "galaxy_info:\n  description: Installs redis\n");

    let inventory = build(&host, &["infra/"]).await.unwrap();

    assert_eq!(inventory.entities.len(), 3);
    match &inventory.get("webserver-12").unwrap().details {
        EntityDetails::Role { description, galaxy_tags, .. } => {
            assert_eq!(description, "Installs nginx");
            assert_eq!(galaxy_tags, &vec!["web".to_string()]);
        }
        other => panic!("expected a role, got {other:?}"),
    }
    match &inventory.get("database-13").unwrap().details {
        EntityDetails::Role { description, platforms, .. } => {
            assert!(description.is_empty());
            assert!(platforms.is_empty());
        }
        other => panic!("expected a role, got {other:?}"),
    }
    assert!(inventory.get("cache-14").is_some());
}

#[tokio::test]
async fn test_build_is_idempotent() {
    let host = MockHost::new()
        .with_role(12, "infra/webserver", WEBSERVER_META)
        .with_play(
            5,
            "ops/site",
            "- src: git@gitlab.example.com:infra/webserver.git\n- name: community.general\n- src: git@gitlab.example.com:infra/gone.git\n",
        );

    let first = build(&host, &["infra/", "ops/"]).await.unwrap();
    let second = build(&host, &["infra/", "ops/"]).await.unwrap();

    assert_eq!(first.entities, second.entities);
    assert_eq!(first.edges, second.edges);
}

#[tokio::test]
async fn test_every_entity_has_consistent_kind_and_urls() {
    let host = MockHost::new()
        .with_role(12, "infra/webserver", WEBSERVER_META)
        .with_play(
            5,
            "ops/site",
            "- src: git@gitlab.example.com:infra/webserver.git\n- name: community.general\n- src: git@gitlab.example.com:infra/gone.git\n",
        );

    let inventory = build(&host, &["infra/", "ops/"]).await.unwrap();

    assert_eq!(inventory.entities.len(), 4);
    for entity in inventory.entities.values() {
        assert_eq!(entity.kind().is_placeholder(), entity.url().is_empty());
        assert_eq!(entity.kind().is_placeholder(), entity.web_url().is_empty());
    }
    let summary = inventory.summary();
    assert_eq!((summary.roles, summary.plays, summary.external, summary.unknown), (1, 1, 1, 1));
}
