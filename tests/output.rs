use thesis::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("thesis digest: Soil microbiomes (2024-06-10)");
    human.push_summary("due within", "3 day(s): 1 task(s)");
    human.push_detail("Draft methodology (due 2024-06-12, progress 50%)");
    human.push_warning("no writing logged in 6 day(s)");
    human.push_next_step("thesis words log <words>");

    let rendered = format_human(&human);
    assert!(rendered.contains("thesis digest: Soil microbiomes"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- due within: 3 day(s): 1 task(s)"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- Draft methodology (due 2024-06-12, progress 50%)"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("- no writing logged in 6 day(s)"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- thesis words log <words>"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("thesis init: nothing to do");
    let rendered = format_human(&human);
    assert_eq!(rendered, "thesis init: nothing to do");
}

#[test]
fn empty_summary_value_renders_key_only() {
    let mut human = HumanOutput::new("thesis streak: Thesis");
    human.push_summary("no activity today", "");
    let rendered = format_human(&human);
    assert!(rendered.ends_with("- no activity today"));
}
