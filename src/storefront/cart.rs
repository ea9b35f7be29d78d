use crate::checkout::{CheckoutItem, PaymentItem, ProductView};

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: ProductView,
    pub qty: u32,
}

/// In-memory quantities per product. Nothing here is persisted; a new cart
/// starts every product at zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(products: Vec<ProductView>) -> Self {
        Self {
            lines: products
                .into_iter()
                .map(|product| CartLine { product, qty: 0 })
                .collect(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Set the quantity for a product. Returns false if the product is not
    /// in the catalog.
    pub fn set_qty(&mut self, product_id: &str, qty: u32) -> bool {
        match self.lines.iter_mut().find(|line| line.product.id == product_id) {
            Some(line) => {
                line.qty = qty;
                true
            }
            None => false,
        }
    }

    /// Set the quantity for whichever product sells at `price_id`.
    pub fn set_qty_by_price(&mut self, price_id: &str, qty: u32) -> bool {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product.price_id.as_deref() == Some(price_id))
        {
            Some(line) => {
                line.qty = qty;
                true
            }
            None => false,
        }
    }

    pub fn qty(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product.id == product_id)
            .map(|line| line.qty)
            .unwrap_or(0)
    }

    /// Lines that will actually be bought: positive quantity and a price.
    fn purchasable(&self) -> impl Iterator<Item = (&CartLine, &str)> {
        self.lines.iter().filter(|line| line.qty > 0).filter_map(|line| {
            line.product
                .price_id
                .as_deref()
                .map(|price_id| (line, price_id))
        })
    }

    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.purchasable()
            .map(|(line, price_id)| CheckoutItem {
                price_id: price_id.to_string(),
                qty: line.qty,
            })
            .collect()
    }

    pub fn payment_items(&self) -> Vec<PaymentItem> {
        self.purchasable()
            .map(|(line, price_id)| PaymentItem {
                price_id: price_id.to_string(),
                price: line.product.price,
                qty: line.qty,
            })
            .collect()
    }

    /// Display total in major units.
    pub fn total(&self) -> f64 {
        self.purchasable()
            .map(|(line, _)| line.product.price * line.qty as f64)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.purchasable().next().is_none()
    }
}
