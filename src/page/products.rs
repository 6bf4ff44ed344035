//! Product, shop and cart pages of the components site, read for the product
//! image each one shows.

use crate::browser::driver::LoadState;
use crate::browser::query::ElementQuery;
use crate::error::{HarnessError, Result};
use crate::page::PageContext;

const CART_IMAGE: &str = "img.cart-item-image";
const ADD_TO_CART: &str = "role=button[name=/add to cart/i]";

/// Where a product image is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Showcase {
    Product,
    Shop,
    Cart,
}

impl Showcase {
    pub fn label(self) -> &'static str {
        match self {
            Showcase::Product => "product page",
            Showcase::Shop => "shop page",
            Showcase::Cart => "cart page",
        }
    }
}

pub struct ProductPage<'a> {
    ctx: PageContext<'a>,
    product: String,
}

impl<'a> ProductPage<'a> {
    /// Pages showing the product whose image `alt` text contains `product`.
    pub fn new(ctx: PageContext<'a>, product: impl Into<String>) -> Self {
        ProductPage {
            ctx,
            product: product.into(),
        }
    }

    /// Open `path` on the components site and wait for the network to settle.
    pub fn visit(&mut self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.ctx.config().sites.components.trim_end_matches('/'), path);
        self.ctx.open_until(&url, LoadState::NetworkIdle)
    }

    fn image(&self, showcase: Showcase) -> ElementQuery {
        let by_alt = format!("img[alt*='{}']", self.product);
        match showcase {
            Showcase::Cart => ElementQuery::new(format!("{}, {}", CART_IMAGE, by_alt)).first(),
            _ => ElementQuery::new(by_alt).first(),
        }
    }

    /// Wait for the product image and return its `src`.
    pub fn image_source(&mut self, showcase: Showcase) -> Result<String> {
        let image = self.image(showcase);
        let operation = format!("read image on {}", showcase.label());
        self.ctx.expect_visible(&operation, &image)?;
        match self.ctx.attribute(&image, "src")? {
            Some(src) if !src.trim().is_empty() => Ok(src.trim().to_string()),
            _ => Err(HarnessError::not_ready(operation, format!("{} to have a src", image))),
        }
    }

    /// Add the product to the cart when the page offers the button.
    pub fn add_to_cart(&mut self) -> Result<bool> {
        let button = ElementQuery::new(ADD_TO_CART);
        if !self.ctx.is_visible_now(&button)? {
            return Ok(false);
        }
        self.ctx.click("add to cart", &button)?;
        self.ctx.wait_for_load(LoadState::NetworkIdle)?;
        Ok(true)
    }
}

/// The file an image URL points at, ignoring host, directories, query and
/// framework image-proxy wrapping (`/_next/image?url=%2Fimg%2Fa.jpg&w=64`).
pub fn image_asset(src: &str) -> String {
    let target = src
        .split_once('?')
        .and_then(|(_, query)| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("url="))
                .map(|wrapped| wrapped.replace("%2F", "/").replace("%2f", "/"))
        })
        .unwrap_or_else(|| src.split(['?', '#']).next().unwrap_or(src).to_string());
    let target = target.split(['?', '#']).next().unwrap_or(&target);
    target
        .rsplit('/')
        .next()
        .unwrap_or(target)
        .to_lowercase()
}
