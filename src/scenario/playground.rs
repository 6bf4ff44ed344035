use tracing::info;

use crate::error::Result;
use crate::fixture::Fixtures;
use crate::flow::converge::{converge, OrderTag, Reorderable};
use crate::page::widgets::TAG_LIMIT;
use crate::scenario::context::TestContext;

pub(super) fn sortable_list(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let max_actions = fx.config().convergence.max_actions;

    ctx.step("open sortable list");
    let mut list = fx.sortable_list()?;
    list.open()?;
    let total = list.item_count()?;
    ctx.check("sortable list has items", total > 0)?;

    ctx.step("sort until every item is right");
    let report = converge(&mut list, max_actions)?;
    info!(actions = report.actions, passes = report.passes, "sortable list converged");

    ctx.step("re-read final order");
    let items = list.read_items()?;
    ctx.check_eq("item count", total, items.len())?;
    let wrong: Vec<&str> = items
        .iter()
        .filter(|item| item.tag != OrderTag::Correct)
        .map(|item| item.name.as_str())
        .collect();
    ctx.check_eq("items not tagged right", Vec::<&str>::new(), wrong)
}

pub(super) fn tags_input(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let tags: Vec<String> = fx.data().get("tags")?;

    ctx.step("open tags input");
    let mut page = fx.tags_input()?;
    page.open()?;
    page.remove_all()?;

    ctx.step("add tags up to the limit");
    for tag in &tags {
        if !page.add_tag(tag)? {
            break;
        }
    }

    ctx.step("read tags");
    let added = page.tags()?;
    ctx.check(format!("at most {} tags ({} shown)", TAG_LIMIT, added.len()), added.len() <= TAG_LIMIT)?;
    for tag in &added {
        ctx.check(format!("tag {:?} comes from the data set", tag), tags.contains(tag))?;
    }
    Ok(())
}

pub(super) fn verify_account(fx: &mut Fixtures, ctx: &mut TestContext, valid_code: bool) -> Result<()> {
    let key = if valid_code {
        "verify_account.valid_code"
    } else {
        "verify_account.invalid_code"
    };
    let code: String = fx.data().get(key)?;
    let within = fx.config().timeouts.visibility();

    ctx.step("open verify account");
    let mut page = fx.verify_account()?;
    page.open()?;

    ctx.step("enter code");
    page.enter_code(&code)?;

    ctx.step("read outcome");
    let success = page.success_visible(within)?;
    ctx.check_eq("success message shown", valid_code, success)?;
    if !valid_code {
        let heading = page.heading_visible()?;
        ctx.check("form heading still shown", heading)?;
    }
    Ok(())
}

pub(super) fn shadow_dom(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let expected: String = fx.data().get("shadow_dom.expected_progress")?;

    ctx.step("open shadow DOM");
    let mut page = fx.shadow_dom()?;
    page.open()?;

    ctx.step("boost progress");
    page.boost()?;
    ctx.check_result(format!("progress reaches {}%", expected), page.expect_progress(&expected))
}

pub(super) fn stars_rating(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let expected_url: String = fx.data().get("stars_rating.url")?;
    let stars: u8 = fx.data().get_or("stars_rating.stars", 5)?;

    ctx.step("open stars rating");
    let mut page = fx.stars_rating()?;
    page.open()?;

    for n in 1..=stars {
        ctx.step(format!("rate {} stars", n));
        let url = page.rate(n)?;
        ctx.check_eq(format!("url after {} stars", n), expected_url.as_str(), url.as_str())?;
    }
    Ok(())
}

pub(super) fn new_tab(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let expected_url: String = fx.data().get("new_tab.url")?;
    let expected_header: String = fx.data().get("new_tab.header")?;

    ctx.step("open new tab section");
    let mut page = fx.new_tab()?;
    page.open()?;

    ctx.step("open new tab");
    let tab = page.open_new_tab()?;
    let header = page.tab_header(&tab)?;
    ctx.check_eq("new tab url", expected_url.as_str(), tab.url.as_str())?;
    ctx.check_eq("new tab header", expected_header.trim(), header.trim())?;

    ctx.step("close new tab");
    page.close_tab(&tab)
}

pub(super) fn popup(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    ctx.step("open pop-up section");
    let mut page = fx.popup()?;
    page.open()?;

    ctx.step("submit pop-up");
    let popup = page.submit_popup()?;
    info!(page = popup.id.0, url = %popup.url, "pop-up submitted and closed");

    let info = page.info_text()?;
    ctx.check("pop-up info text shown", !info.trim().is_empty())
}

pub(super) fn nested_iframe(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    ctx.step("open nested iframe");
    let mut page = fx.nested_frames()?;
    page.open()?;

    ctx.step("click inner frame button");
    page.click_button()?;
    let message = page.message()?;
    ctx.check("inner frame message shown", !message.trim().is_empty())
}
