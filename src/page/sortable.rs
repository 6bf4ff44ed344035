use crate::browser::driver::{Action, ElementState};
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::flow::converge::{OrderTag, OrderableItem, Reorderable};
use crate::page::{PageContext, open_playground_section};

const SECTION_HEADING: &str = r#"//h3[text()="Sortable List"]"#;
const LIST: &str = "#draggable-list";
const ITEMS: &str = "#draggable-list li";
const ITEM_NAMES: &str = "#draggable-list li .person-name";
const JUDGED_ITEM: &str = "#draggable-list li.right, #draggable-list li.wrong";
const CHECK_BUTTON: &str = "#check";
const CORRECT_CLASS: &str = "right";
const INCORRECT_CLASS: &str = "wrong";

/// The "10 Richest People" drag-to-sort list on the playground.
pub struct SortableListPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> SortableListPage<'a> {
    pub fn new(ctx: PageContext<'a>) -> Self {
        SortableListPage { ctx }
    }

    pub fn open(&mut self) -> Result<()> {
        open_playground_section(&mut self.ctx, SECTION_HEADING, LIST)
    }

    pub fn item_count(&mut self) -> Result<usize> {
        self.ctx.count(&ElementQuery::new(ITEMS))
    }

    pub fn names(&mut self) -> Result<Vec<String>> {
        self.ctx.texts(&ElementQuery::new(ITEM_NAMES))
    }

    /// Drag the item at `from` onto the slot at `to`.
    pub fn drag(&mut self, from: usize, to: usize) -> Result<()> {
        if from == to {
            return Ok(());
        }
        let source = ElementQuery::new(ITEMS).nth(from);
        let target = ElementQuery::new(ITEMS).nth(to);
        self.ctx.perform(
            &format!("drag item {} to {}", from, to),
            &source,
            &Action::DragTo { target, force: true },
        )
    }

    pub fn check(&mut self) -> Result<()> {
        self.ctx.click("check order", &ElementQuery::new(CHECK_BUTTON))?;
        self.ctx
            .wait_for("check order", &ElementQuery::new(JUDGED_ITEM).first(), ElementState::Attached)
    }
}

impl Reorderable for SortableListPage<'_> {
    fn read_items(&mut self) -> Result<Vec<OrderableItem>> {
        let names = self.names()?;
        let classes = self.ctx.attributes(&ElementQuery::new(ITEMS), "class")?;
        if names.len() != classes.len() {
            return Err(HarnessError::mismatch("sortable list names per item", classes.len(), names.len()));
        }
        Ok(names
            .into_iter()
            .zip(classes)
            .enumerate()
            .map(|(position, (name, class))| OrderableItem {
                position,
                name,
                tag: OrderTag::from_class(class.as_deref(), CORRECT_CLASS, INCORRECT_CLASS),
            })
            .collect())
    }

    fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        self.drag(from, to)
    }

    fn check_order(&mut self) -> Result<()> {
        self.check()
    }
}
