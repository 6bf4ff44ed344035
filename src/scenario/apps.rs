use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::fixture::Fixtures;
use crate::page::menus::Submenu;
use crate::scenario::context::TestContext;

#[derive(Debug, Deserialize)]
struct Superhero {
    superhero: String,
    real_name: String,
}

pub(super) fn context_menu(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let items: Vec<String> = fx.data().get("context_menu.items")?;
    let share_menu: String = fx.data().get("context_menu.share_menu")?;
    let share_items: Vec<String> = fx.data().get("context_menu.share_items")?;

    ctx.step("open context menu");
    let mut page = fx.context_menu()?;
    page.open()?;

    ctx.step("choose every menu item");
    for item in &items {
        let message = page.choose(item)?;
        ctx.check_contains(format!("message after {:?}", item), &message, item)?;
    }

    ctx.step(format!("choose every {} item", share_menu));
    for item in &share_items {
        let message = page.choose_from_submenu(&share_menu, item)?;
        ctx.check_contains(format!("message after {:?}", item), &message, item)?;
    }
    Ok(())
}

pub(super) fn multi_level_dropdown(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let settings: Vec<String> = fx.data().get("multi_dropdown.settings_options")?;
    let animals: Vec<String> = fx.data().get("multi_dropdown.animal_options")?;

    ctx.step("open multi level dropdown");
    let mut page = fx.multi_dropdown()?;
    page.open()?;
    let toggle = page.toggle_visible()?;
    ctx.check("dropdown toggle shown", toggle)?;

    ctx.step("expand main menu");
    page.expand()?;

    for (submenu, expected) in [(Submenu::Settings, &settings), (Submenu::Animals, &animals)] {
        ctx.step(format!("browse {} submenu", submenu.label()));
        page.enter(submenu)?;
        let missing = page.missing_options(expected)?;
        ctx.check_eq(format!("{} options missing", submenu.label()), Vec::<String>::new(), missing)?;
        page.back(submenu)?;
    }

    ctx.step("dropdown still usable");
    let toggle = page.toggle_visible()?;
    ctx.check("dropdown toggle shown", toggle)
}

pub(super) fn covered_elements(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    ctx.step("open covered elements");
    let mut page = fx.covered_elements()?;
    page.open()?;
    let instruction = page.instruction_visible()?;
    ctx.check("instruction text shown", instruction)?;

    ctx.step("reveal fugitive link");
    let revealed = page.reveal_fugitive_link()?;
    ctx.check("fugitive link shown", revealed)
}

pub(super) fn onboarding_modal(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    ctx.step("open onboarding modal");
    let mut page = fx.onboarding_modal()?;
    page.open()?;

    ctx.step("show modal");
    page.show_modal()?;
    let welcome = page.welcome_visible()?;
    ctx.check("welcome text shown", welcome)?;
    let title = page.title()?;
    ctx.check("modal title shown", !title.trim().is_empty())
}

pub(super) fn fetch_data(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let min_posts: usize = fx.data().get_or("fetch_data.min_posts", 1)?;

    ctx.step("open fetching data");
    let mut page = fx.fetch_data()?;
    page.open()?;

    ctx.step("count fetched posts");
    let count = page.post_count()?;
    info!(posts = count, "posts fetched");
    ctx.check(format!("at least {} posts ({} shown)", min_posts, count), count >= min_posts)?;
    let empty = page.post_texts()?.iter().filter(|t| t.trim().is_empty()).count();
    ctx.check_eq("empty post cards", 0, empty)
}

pub(super) fn superhero_table(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let heroes: Vec<Superhero> = fx.data().get("superheroes")?;

    ctx.step("open dynamic table");
    let mut page = fx.superhero_table()?;
    page.open()?;

    ctx.step("read every real name");
    for hero in &heroes {
        // Display names may carry a second line with the hero's email
        let name = hero.superhero.lines().next().unwrap_or_default().trim();
        let real_name = page.real_name(name)?;
        ctx.check_eq(format!("real name of {}", name), hero.real_name.as_str(), real_name.as_str())?;
    }
    Ok(())
}

pub(super) fn redirect_chain(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let pages: Vec<String> = fx.data().get("redirect_chain.pages")?;
    let last_page_text: String = fx.data().get("redirect_chain.last_page_text")?;

    ctx.step("open redirect chain");
    let mut page = fx.redirect_chain()?;
    page.open()?;

    ctx.step("follow the chain");
    page.start()?;
    ctx.check_result(format!("passed through {} pages", pages.len()), page.follow(&pages))?;
    page.expect_last_page(&last_page_text)?;
    if let Some(last) = pages.last() {
        let url = page.url()?;
        ctx.check_contains("final url", &url, last)?;
    }

    ctx.step("go back to start");
    page.go_back()
}
