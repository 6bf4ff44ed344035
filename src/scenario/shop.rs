use tracing::info;

use crate::error::Result;
use crate::fixture::Fixtures;
use crate::page::products::{Showcase, image_asset};
use crate::scenario::context::TestContext;

/// The product shows the same image on its own page, in the shop listing,
/// and in the cart.
pub(super) fn product_image(fx: &mut Fixtures, ctx: &mut TestContext) -> Result<()> {
    let product: String = fx.data().get("product_image.product")?;
    let product_path: String = fx.data().get("product_image.product_path")?;
    let shop_path: String = fx.data().get("product_image.shop_path")?;
    let cart_path: String = fx.data().get("product_image.cart_path")?;

    let mut page = fx.product(&product)?;

    ctx.step("product page image");
    page.visit(&product_path)?;
    let baseline = image_asset(&page.image_source(Showcase::Product)?);
    info!(asset = %baseline, "product image");
    ctx.check(format!("product image names a file ({:?})", baseline), !baseline.is_empty())?;

    ctx.step("shop page image");
    page.visit(&shop_path)?;
    let shop = image_asset(&page.image_source(Showcase::Shop)?);
    ctx.check_eq("shop image", baseline.as_str(), shop.as_str())?;

    ctx.step("cart page image");
    page.add_to_cart()?;
    page.visit(&cart_path)?;
    let cart = image_asset(&page.image_source(Showcase::Cart)?);
    ctx.check_eq("cart image", baseline.as_str(), cart.as_str())
}
