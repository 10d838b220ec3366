use anyhow::Result;

use quicksearch::query_engine::{QueryEngine, render_html};

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

fn engine(use_synonyms: bool, top_k: usize) -> Result<QueryEngine> {
    QueryEngine::from_file(fixture("entities.tsv"), use_synonyms, top_k)
}

#[test]
fn test_search_ranks_by_ped_then_score() -> Result<()> {
    let engine = engine(true, 5)?;
    let outcome = engine.search("angel");

    let names: Vec<&str> = outcome.top.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Angela Merkel", "Angelina Jolie", "angel", "Angel Falls", "Angela Davis"]
    );
    assert!(outcome.top.iter().all(|e| e.ped == 0));
    assert_eq!(outcome.total_matches, 6);
    assert_eq!(outcome.top[0].score, 205);
    assert_eq!(outcome.top[3].via, "Angel Falls");
    Ok(())
}

#[test]
fn test_search_tolerates_typos() -> Result<()> {
    let engine = engine(false, 5)?;
    let outcome = engine.search("eyjaffjala");

    assert_eq!(outcome.normalized, "eyjaffjala");
    let got: Vec<(&str, i64)> = outcome
        .top
        .iter()
        .map(|e| (e.name.as_str(), e.score))
        .collect();
    assert_eq!(got, vec![("Eyjafjallajökull", 76), ("Eyjafjallajökull", 8)]);
    assert_eq!(outcome.top[1].description, "2013 film by Alexandre Coffre");
    Ok(())
}

#[test]
fn test_search_via_synonym() -> Result<()> {
    let engine = engine(true, 5)?;
    let outcome = engine.search("Angie");

    assert_eq!(outcome.top[0].name, "Angela Merkel");
    assert_eq!(outcome.top[0].via, "Angie");
    assert_eq!(outcome.top[0].ped, 0);
    Ok(())
}

#[test]
fn test_search_truncates_to_top_k() -> Result<()> {
    let engine = engine(false, 2)?;
    let outcome = engine.search("angel");
    assert_eq!(outcome.top.len(), 2);
    assert_eq!(outcome.total_matches, 6);
    Ok(())
}

#[test]
fn test_empty_query_finds_nothing() -> Result<()> {
    let engine = engine(false, 5)?;
    for query in ["", "   ", "!?!"] {
        let outcome = engine.search(query);
        assert!(outcome.top.is_empty(), "{query:?} should find nothing");
        assert_eq!(render_html(&outcome), "");
    }
    Ok(())
}

#[test]
fn test_render_html_lists_results_in_order() -> Result<()> {
    let engine = engine(true, 5)?;
    let html = render_html(&engine.search("angel"));

    assert!(html.starts_with("Got 6 result(s), merged 5 lists"));
    assert!(html.contains("<table>"));
    assert!(html.contains("Angela Merkel (score=205, ped=0, via 'Angela Merkel')"));
    let merkel = html.find("Angela Merkel").unwrap();
    let davis = html.find("Angela Davis").unwrap();
    assert!(merkel < davis);
    assert!(!html.contains('\n'));
    Ok(())
}

#[test]
fn test_render_html_escapes_entity_text() -> Result<()> {
    let engine = engine(false, 10)?;
    let html = render_html(&engine.search("angel"));

    assert!(html.contains("Angel &lt;Test&gt;"));
    assert!(html.contains("description with &lt;b&gt;markup&lt;/b&gt; &amp; ampersand"));
    assert!(!html.contains("<b>markup"));
    Ok(())
}

#[test]
fn test_missing_file_is_an_error() {
    let err = QueryEngine::from_file(fixture("nope.tsv"), false, 5)
        .err()
        .expect("building from a missing file must fail");
    assert!(format!("{err:#}").contains("nope.tsv"));
}
