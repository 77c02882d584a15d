use std::fs;

use regex::Regex;
use spectral::assert_that;
use tempfile::TempDir;

use pagedigest::{ResearchStore, sanitize_file_name};

fn example_links() -> Vec<String> {
    vec![
        "https://one.example/".to_string(),
        "https://two.example/".to_string(),
    ]
}

#[test]
fn names_are_sanitized_for_file_use() {
    assert_that(&sanitize_file_name("My Report!")).is_equal_to("My_Report_".to_string());
    assert_that(&sanitize_file_name("..hidden.name..")).is_equal_to("hidden.name".to_string());
    assert_that(&sanitize_file_name("a  b***c")).is_equal_to("a_b_c".to_string());
}

#[test]
fn open_initializes_an_empty_digest() {
    let temp = TempDir::new().expect("Expected a temp dir.");

    ResearchStore::open(temp.path()).expect("Expected the store to open.");

    let digest = fs::read_to_string(temp.path().join("research").join("research_digest.json"))
        .expect("Expected the digest file to exist.");
    assert_that(&digest).is_equal_to("[]".to_string());
}

#[test]
fn persisted_research_gets_title_header_and_unique_id() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");

    let id = store
        .persist("Body text", "My Report!", &example_links(), true)
        .expect("Expected the research to be filed.");

    let id_shape = Regex::new(r"^My_Report_-[A-Za-z0-9]{4}$").expect("Expected a valid regex.");
    assert_that(&id_shape.is_match(&id)).is_equal_to(true);
    let text = fs::read_to_string(temp.path().join("research").join(format!("{id}.md")))
        .expect("Expected the document file to exist.");
    assert_that(&text).is_equal_to("# My Report!\nBody text".to_string());
}

#[test]
fn title_header_can_be_skipped() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");

    let id = store
        .persist("Body text", "Plain", &example_links(), false)
        .expect("Expected the research to be filed.");

    let text = fs::read_to_string(temp.path().join("research").join(format!("{id}.md")))
        .expect("Expected the document file to exist.");
    assert_that(&text).is_equal_to("Body text".to_string());
}

#[test]
fn details_return_record_and_text() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");
    let links = example_links();
    let id = store
        .persist("Body", "Topic", &links, true)
        .expect("Expected the research to be filed.");

    let (record, text) = store
        .get_details(&id, false)
        .expect("Expected the research to be found.");

    assert_that(&record.id).is_equal_to(id.clone());
    assert_that(&record.name).is_equal_to("Topic".to_string());
    assert_that(&record.file_name).is_equal_to(format!("{id}.md"));
    assert_that(&record.links).is_equal_to(links);
    assert_that(&record.archived).is_equal_to(false);
    let date_shape = Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2} \+0000$")
        .expect("Expected a valid regex.");
    assert_that(&date_shape.is_match(&record.created_date)).is_equal_to(true);
    assert_that(&text).is_equal_to("# Topic\nBody".to_string());
}

#[test]
fn record_name_stores_the_sanitized_form() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");
    let id = store
        .persist("Body", "My Report!", &example_links(), true)
        .expect("Expected the research to be filed.");

    let (record, _) = store
        .get_details(&id, false)
        .expect("Expected the research to be found.");

    assert_that(&record.name).is_equal_to("My_Report_".to_string());
}

#[test]
fn archived_research_is_hidden_but_kept() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");
    let id = store
        .persist("Body", "Topic", &example_links(), true)
        .expect("Expected the research to be filed.");

    store
        .delete(&id, false)
        .expect("Expected the archive to succeed.");

    assert_that(&store.list_ids(false).is_empty()).is_equal_to(true);
    assert_that(&store.list_ids(true)).is_equal_to(vec![id.clone()]);
    assert_that(&store.get_details(&id, false).is_none()).is_equal_to(true);
    let (record, text) = store
        .get_details(&id, true)
        .expect("Expected the archived research to stay reachable.");
    assert_that(&record.archived).is_equal_to(true);
    assert_that(&text.is_empty()).is_equal_to(false);
    assert_that(
        &temp
            .path()
            .join("research")
            .join(format!("{id}.md"))
            .exists(),
    )
    .is_equal_to(true);
}

#[test]
fn permanent_delete_removes_record_and_file() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");
    let id = store
        .persist("Body", "Topic", &example_links(), true)
        .expect("Expected the research to be filed.");

    store
        .delete(&id, true)
        .expect("Expected the delete to succeed.");

    assert_that(&store.list_ids(true).is_empty()).is_equal_to(true);
    assert_that(
        &temp
            .path()
            .join("research")
            .join(format!("{id}.md"))
            .exists(),
    )
    .is_equal_to(false);
}

#[test]
fn deleting_unknown_research_is_a_no_op() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");

    store
        .delete("missing-0000", false)
        .expect("Expected no error for an unknown id.");
    store
        .delete("missing-0000", true)
        .expect("Expected no error for an unknown id.");
}

#[test]
fn missing_document_file_degrades_to_empty_text() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");
    let id = store
        .persist("Body", "Topic", &example_links(), true)
        .expect("Expected the research to be filed.");
    fs::remove_file(temp.path().join("research").join(format!("{id}.md")))
        .expect("Expected the document file to be removable.");

    let (record, text) = store
        .get_details(&id, false)
        .expect("Expected the record to survive.");

    assert_that(&record.id).is_equal_to(id);
    assert_that(&text).is_equal_to(String::new());
}

#[test]
fn digest_round_trips_across_reopen() {
    let temp = TempDir::new().expect("Expected a temp dir.");
    let id = {
        let mut store = ResearchStore::open(temp.path()).expect("Expected the store to open.");
        store
            .persist("Body", "Topic", &example_links(), true)
            .expect("Expected the research to be filed.")
    };

    let reopened = ResearchStore::open(temp.path()).expect("Expected the digest to load.");

    assert_that(&reopened.list_ids(false)).is_equal_to(vec![id]);
}

#[test]
fn parallel_stores_overwrite_each_other() {
    // Two stores over one folder do not merge digests. The last digest
    // write wins and the records the other store filed are dropped.
    let temp = TempDir::new().expect("Expected a temp dir.");
    let mut first = ResearchStore::open(temp.path()).expect("Expected the store to open.");
    let mut second = ResearchStore::open(temp.path()).expect("Expected the store to open.");

    first
        .persist("Body", "First", &example_links(), true)
        .expect("Expected the research to be filed.");
    let second_id = second
        .persist("Body", "Second", &example_links(), true)
        .expect("Expected the research to be filed.");

    let reopened = ResearchStore::open(temp.path()).expect("Expected the digest to load.");
    assert_that(&reopened.list_ids(true)).is_equal_to(vec![second_id]);
}
