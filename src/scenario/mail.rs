use tracing::info;

use crate::error::Result;
use crate::fixture::Fixtures;
use crate::flow::poll::{poll, PollPolicy};
use crate::page::mailbox::MailAddress;
use crate::scenario::context::TestContext;

pub(super) fn email_verification(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let prefix: String = fx.data().get_or("screener.inbox_prefix", "testuser".to_string())?;
    let password: String = fx.data().get("screener.password")?;
    let sender: String = fx.data().get("screener.sender")?;
    let expected_texts: Vec<String> = fx.data().get("screener.expected_texts")?;
    let address = MailAddress::unique(&prefix, &fx.config().sites.mail_domain);
    let policy = PollPolicy::from_config(fx.config());

    ctx.step("register account");
    fx.signup()?.register(&address, &password)?;

    ctx.step("open inbox");
    let mut inbox = fx.inbox()?;
    inbox.open_inbox(&address.inbox)?;

    ctx.step("wait for confirmation email");
    let outcome = poll(&mut inbox.watch_for(&sender), &policy)?;
    info!(found = outcome.is_found(), attempts = outcome.attempts(), "inbox polled");
    ctx.check(
        format!("email from {} within {} attempts", sender, policy.max_attempts),
        outcome.is_found(),
    )?;
    let body = outcome.into_value().unwrap_or_default();

    ctx.step("read confirmation email");
    for text in &expected_texts {
        ctx.check_contains(format!("email mentions {:?}", text), &body, text)?;
    }
    Ok(())
}
