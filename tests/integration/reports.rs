use std::fs;

use rolegraph::cli::run;
use rolegraph::core::{RolegraphError, user_friendly_error};
use rolegraph::inventory::InventoryBuilder;
use rolegraph::report::write_reports;
use rolegraph::test_utils::{MockHost, test_settings};
use tempfile::TempDir;

fn host() -> MockHost {
    MockHost::new()
        .with_role(12, "infra/webserver", "galaxy_info:\n  description: Installs nginx\n")
        .with_play(
            5,
            "ops/site",
            "- src: git@gitlab.example.com:infra/webserver.git\n- name: community.general\n",
        )
}

#[tokio::test]
async fn test_reports_are_written() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("public");
    let host = host();
    let settings = test_settings(&["infra/", "ops/"], &output);

    let inventory = InventoryBuilder::new(&host, &settings).build().await.unwrap();
    let written = write_reports(&inventory, &settings).await.unwrap();

    assert_eq!(
        written,
        vec![
            output.join("ansible_roles.html"),
            output.join("ansible_roles_incl_unknown.html"),
            output.join("ansible_roles.gv"),
        ]
    );

    let default_html = fs::read_to_string(output.join("ansible_roles.html")).unwrap();
    assert!(default_html.contains("Installs nginx"));
    assert!(!default_html.contains("community.general"));

    let full_html = fs::read_to_string(output.join("ansible_roles_incl_unknown.html")).unwrap();
    assert!(full_html.contains("community.general"));

    let dot = fs::read_to_string(output.join("ansible_roles.gv")).unwrap();
    assert!(dot.contains("\"site\" -> \"webserver\""));
    assert!(dot.contains("\"site\" -> \"community.general\""));
    assert!(dot.contains("\"webserver\" [fillcolor=lightblue]"));
    assert!(dot.contains("\"site\" [fillcolor=limegreen]"));
}

#[tokio::test]
async fn test_custom_template_and_prefix() {
    let temp = TempDir::new().unwrap();
    let template = temp.path().join("list.html.tera");
    fs::write(
        &template,
        "{% for id, p in projects_data %}{{ id }}={{ p.kind }};{% endfor %}{{ show_unknown }}",
    )
    .unwrap();

    let host = host();
    let mut settings = test_settings(&["infra/", "ops/"], temp.path());
    settings.template = Some(template);
    settings.dest_prefix = "inventory".to_string();

    run(&host, &settings).await.unwrap();

    let html = fs::read_to_string(temp.path().join("inventory.html")).unwrap();
    assert_eq!(
        html,
        "site-5=play;webserver-12=role;zzz-unknown-1=role_external;false"
    );
    let html = fs::read_to_string(temp.path().join("inventory_incl_unknown.html")).unwrap();
    assert!(html.ends_with("true"));
}

#[tokio::test]
async fn test_rejected_authentication_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let host = host().rejecting_auth();
    let settings = test_settings(&["infra/"], temp.path());

    let err = run(&host, &settings).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<RolegraphError>(),
        Some(RolegraphError::AuthenticationFailed { .. })
    ));
    assert_eq!(user_friendly_error(err).exit_code(), 1);
    assert!(!temp.path().join("ansible_roles.html").exists());
}
