use serde::{Deserialize, Serialize};

use crate::browser::driver::Action;
use crate::browser::query::ElementQuery;
use crate::error::Result;
use crate::fixture::config::Sites;
use crate::page::PageContext;

const INTERACTIONS: &str = r#"//a[normalize-space(text())="Interactions"]"#;
const DRAG_AND_DROP: &str = r#"//a[normalize-space(text())="Drag and Drop"]"#;
const STATIC: &str = r#"//a[normalize-space(text())="Static"]"#;
const DROP_AREA: &str = r#"//div[@id="droparea"]"#;

/// The draggable logos on the static drag-and-drop page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragItem {
    Angular,
    Mongo,
    Node,
}

impl DragItem {
    pub const ALL: [DragItem; 3] = [DragItem::Angular, DragItem::Mongo, DragItem::Node];

    pub fn id(&self) -> &'static str {
        match self {
            DragItem::Angular => "angular",
            DragItem::Mongo => "mongo",
            DragItem::Node => "node",
        }
    }
}

pub struct DragAndDropPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> DragAndDropPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        DragAndDropPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        let url = Sites::join(&self.ctx.config().sites.automation_demo, "Windows.html");
        self.ctx.open(&url)?;
        for link in [INTERACTIONS, DRAG_AND_DROP, STATIC] {
            self.ctx.click("open drag and drop", &ElementQuery::new(link))?;
        }
        self.ctx.expect_visible("open drag and drop", &ElementQuery::new(DROP_AREA))
    }

    pub fn drag(&mut self, item: DragItem) -> Result<()> {
        let source = ElementQuery::new(format!(r#"//img[@id="{}"]"#, item.id()));
        self.ctx.perform(
            &format!("drag {}", item.id()),
            &source,
            &Action::DragTo {
                target: ElementQuery::new(DROP_AREA),
                force: false,
            },
        )
    }

    /// Whether the drop area now holds `item`.
    pub fn is_dropped(&mut self, item: DragItem) -> Result<bool> {
        let dropped = ElementQuery::new(format!(r#"#droparea #{}"#, item.id()));
        let within = self.ctx.timeouts().visibility();
        self.ctx.is_visible(&dropped, within)
    }
}
