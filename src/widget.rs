//! Storefront widget
//!
//! Owns the catalog, the cart, the document it renders into and the dispatch
//! table wiring document nodes to actions. Every operation runs to completion
//! inside one event; dialogs and navigation go through the [`Host`].

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::checkout::CheckoutLinks;
use crate::config::WidgetConfig;
use crate::domain::aggregates::{Cart, Catalog, CategoryFilter, SortCriteria};
use crate::domain::value_objects::{CurrencyFormatter, Money, ProductId};
use crate::page::{Action, DispatchTable, Document, EventKind, Host, NodeId};
use crate::{Result, StorefrontError};

pub const ADDED_TO_CART: &str = "Item added to cart!";
pub const CART_EMPTY: &str = "Your cart is empty!";
pub const VIDEO_PROMPT: &str = "Enter the URL of the product demo video:";
pub const REVIEW_PROMPT: &str = "Enter your review:";
pub const REVIEW_ADDED: &str = "Review added successfully!";

const PULSE_CLASS: &str = "pulse";

/// Outcome of starting the widget.
pub enum Boot<H: Host> {
    Mounted(Box<Storefront<H>>),
    /// No session flag: the host was sent to the login page and nothing was rendered.
    Redirected(H),
}

#[derive(Debug, Clone, Copy)]
struct Regions {
    sort_select: NodeId,
    filter_select: NodeId,
    product_grid: NodeId,
    cart_items: NodeId,
    cart_total: NodeId,
    buy_all: NodeId,
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    node: NodeId,
    until: DateTime<Utc>,
}

pub struct Storefront<H: Host> {
    session: Uuid,
    catalog: Catalog,
    cart: Cart,
    document: Document,
    dispatch: DispatchTable,
    regions: Regions,
    formatter: CurrencyFormatter,
    checkout: CheckoutLinks,
    pulse: chrono::Duration,
    pulses: Vec<Pulse>,
    host: H,
}

impl<H: Host> Storefront<H> {
    /// Checks the session flag, then mounts and renders the full catalog.
    pub fn boot(config: &WidgetConfig, catalog: Catalog, mut host: H) -> Result<Boot<H>> {
        let logged_in = host.get_item(&config.session_key).is_some_and(|v| !v.is_empty());
        if !logged_in {
            tracing::info!(login_url = %config.login_url, "no session flag, redirecting to login");
            host.redirect(&config.login_url);
            return Ok(Boot::Redirected(host));
        }
        Ok(Boot::Mounted(Box::new(Self::mount(config, catalog, host)?)))
    }

    fn mount(config: &WidgetConfig, catalog: Catalog, host: H) -> Result<Self> {
        let mut document = Document::new();
        let mut dispatch = DispatchTable::new();
        let regions = build_skeleton(&mut document, &catalog);
        dispatch.bind(regions.sort_select, EventKind::Change, Action::Sort);
        dispatch.bind(regions.filter_select, EventKind::Change, Action::Filter);
        dispatch.bind(regions.buy_all, EventKind::Click, Action::BuyAll);

        let mut widget = Self {
            session: Uuid::new_v4(),
            catalog,
            cart: Cart::new(),
            document,
            dispatch,
            regions,
            formatter: CurrencyFormatter::en_in(),
            checkout: CheckoutLinks::new(config.payment_url.clone()),
            pulse: config.pulse,
            pulses: Vec::new(),
            host,
        };
        let all: Vec<ProductId> = widget.catalog.products().iter().map(|p| p.id()).collect();
        widget.display_products(&all);
        widget.update_cart_display()?;
        tracing::info!(session = %widget.session, products = widget.catalog.len(), "storefront mounted");
        Ok(widget)
    }

    pub fn session_id(&self) -> Uuid { self.session }
    pub fn catalog(&self) -> &Catalog { &self.catalog }
    pub fn cart(&self) -> &Cart { &self.cart }
    pub fn cart_total(&self) -> Result<Money> { Ok(self.cart.total(&self.catalog)?) }
    pub fn document(&self) -> &Document { &self.document }
    pub fn html(&self) -> String { self.document.to_html() }
    pub fn host(&self) -> &H { &self.host }
    pub fn host_mut(&mut self) -> &mut H { &mut self.host }
    pub fn into_host(self) -> H { self.host }

    pub fn sort_select(&self) -> NodeId { self.regions.sort_select }
    pub fn filter_select(&self) -> NodeId { self.regions.filter_select }
    pub fn product_grid(&self) -> NodeId { self.regions.product_grid }
    pub fn cart_items(&self) -> NodeId { self.regions.cart_items }
    pub fn cart_total_node(&self) -> NodeId { self.regions.cart_total }
    pub fn buy_all_button(&self) -> NodeId { self.regions.buy_all }

    /// Buttons still waiting for their pulse to end.
    pub fn pending_pulses(&self) -> usize { self.pulses.len() }

    /// Live control bindings, for hosts that present them.
    pub fn controls(&self) -> Vec<(NodeId, EventKind, Action)> { self.dispatch.bindings() }

    /// Product ids of the cards currently in the grid, in display order.
    pub fn displayed_products(&self) -> Vec<ProductId> {
        self.document
            .query_class_within(self.regions.product_grid, "product-card")
            .into_iter()
            .filter_map(|card| self.document.attr(card, "data-id")?.parse().ok())
            .collect()
    }

    /// Click on `node`. Returns whether a listener handled it.
    pub fn click(&mut self, node: NodeId) -> Result<bool> {
        let Some(action) = self.dispatch.lookup(node, EventKind::Click) else { return Ok(false) };
        self.run(action, None)?;
        Ok(true)
    }

    /// Selection change on `node` to `value`. Returns whether a listener handled it.
    pub fn change(&mut self, node: NodeId, value: &str) -> Result<bool> {
        select_option(&mut self.document, node, value);
        let Some(action) = self.dispatch.lookup(node, EventKind::Change) else { return Ok(false) };
        self.run(action, Some(value))?;
        Ok(true)
    }

    fn run(&mut self, action: Action, value: Option<&str>) -> Result<()> {
        tracing::debug!(session = %self.session, %action, "dispatch");
        match action {
            Action::Sort => self.sort_products(value.unwrap_or_default()),
            Action::Filter => self.filter_products(value.unwrap_or(CategoryFilter::ALL)),
            Action::BuyAll => self.buy_all()?,
            Action::AddToCart(id) => self.add_to_cart(id)?,
            Action::BuyNow(id) => self.go_to_payment(id)?,
            Action::ViewReviews(id) => self.view_reviews_and_videos(id)?,
            Action::AddReview(id) => self.add_review(id)?,
            Action::RemoveFromCart(id) => self.remove_from_cart(id)?,
        }
        Ok(())
    }

    /// Replaces the whole product grid with one card per id.
    pub fn display_products(&mut self, ids: &[ProductId]) {
        let grid = self.regions.product_grid;
        let detached = self.document.clear_children(grid);
        self.dispatch.unbind_nodes(&detached);
        self.pulses.retain(|p| detached.binary_search(&p.node).is_err());

        for id in ids {
            let Some(product) = self.catalog.get(*id) else { continue };
            let doc = &mut self.document;
            let card = doc.create_element_with_class(grid, "div", "product-card");
            doc.set_attr(card, "data-id", &product.id().to_string());
            let img = doc.create_element(card, "img");
            doc.set_attr(img, "src", product.image());
            doc.set_attr(img, "alt", product.name());
            let name = doc.create_element(card, "h3");
            doc.append_text(name, product.name());
            let price = doc.create_element(card, "p");
            doc.append_text(price, &self.formatter.format(product.price()));

            let buttons = doc.create_element_with_class(card, "div", "buttons");
            for (class, label, action) in [
                ("add-to-cart", "Add to Cart", Action::AddToCart(*id)),
                ("buy-now", "Buy Now", Action::BuyNow(*id)),
                ("view-reviews-videos", "View Reviews/Videos", Action::ViewReviews(*id)),
                ("add-review", "Add Review", Action::AddReview(*id)),
            ] {
                let button = doc.create_element_with_class(buttons, "button", class);
                doc.append_text(button, label);
                self.dispatch.bind(button, EventKind::Click, action);
            }
        }
        tracing::debug!(session = %self.session, shown = ids.len(), "products rendered");
    }

    /// Renders the full catalog in `criteria` order; unknown criteria mean catalog order.
    pub fn sort_products(&mut self, criteria: &str) {
        let criteria: SortCriteria = criteria.parse().unwrap_or_default();
        let ids: Vec<ProductId> = self.catalog.sorted(criteria).iter().map(|p| p.id()).collect();
        self.display_products(&ids);
    }

    /// Renders the catalog-ordered products in `category`, or everything for `all`.
    pub fn filter_products(&mut self, category: &str) {
        let filter = CategoryFilter::from(category);
        let ids: Vec<ProductId> = self.catalog.filtered(&filter).iter().map(|p| p.id()).collect();
        self.display_products(&ids);
    }

    pub fn add_to_cart(&mut self, id: ProductId) -> Result<()> {
        self.ensure_product(id)?;
        let quantity = self.cart.add(id);
        tracing::debug!(session = %self.session, product_id = %id, %quantity, "added to cart");
        self.update_cart_display()?;
        self.host.notify(ADDED_TO_CART);
        self.animate_add_to_cart(Utc::now());
        self.flush_events();
        Ok(())
    }

    /// Pulses every add-to-cart button on the page, not only the one clicked.
    /// A button that is already pulsing gets a fresh deadline.
    fn animate_add_to_cart(&mut self, now: DateTime<Utc>) {
        let Some(until) = now.checked_add_signed(self.pulse) else {
            tracing::warn!(session = %self.session, pulse_ms = self.pulse.num_milliseconds(), "pulse deadline out of range, skipping animation");
            return;
        };
        for node in self.document.query_class("add-to-cart") {
            self.document.add_class(node, PULSE_CLASS);
            match self.pulses.iter_mut().find(|p| p.node == node) {
                Some(pulse) => pulse.until = until,
                None => self.pulses.push(Pulse { node, until }),
            }
        }
    }

    /// Clears pulses whose time is up.
    pub fn tick_at(&mut self, now: DateTime<Utc>) {
        let (expired, pending): (Vec<Pulse>, Vec<Pulse>) = self.pulses.drain(..).partition(|p| p.until <= now);
        for pulse in expired {
            self.document.remove_class(pulse.node, PULSE_CLASS);
        }
        self.pulses = pending;
    }

    pub fn tick(&mut self) { self.tick_at(Utc::now()) }

    /// Removes the whole line; absent ids are ignored. The cart view is rebuilt either way.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<()> {
        if self.cart.remove(id) {
            tracing::debug!(session = %self.session, product_id = %id, "removed from cart");
        }
        self.update_cart_display()?;
        self.flush_events();
        Ok(())
    }

    /// Rebuilds the cart lines and the grand total from scratch. Amounts are
    /// computed before anything is cleared, so an out-of-range total leaves the
    /// previous view in place.
    pub fn update_cart_display(&mut self) -> Result<()> {
        let lines = self
            .cart
            .priced(&self.catalog)
            .into_iter()
            .map(|line| -> Result<_> { Ok((line, line.line_total()?)) })
            .collect::<Result<Vec<_>>>()?;
        let total = self.cart.total(&self.catalog)?;

        let items = self.regions.cart_items;
        let detached = self.document.clear_children(items);
        self.dispatch.unbind_nodes(&detached);

        for (line, line_total) in lines {
            let doc = &mut self.document;
            let row = doc.create_element_with_class(items, "div", "cart-item");
            let label = doc.create_element(row, "span");
            doc.append_text(label, &format!("{} ({})", line.product.name(), line.quantity));
            let amount = doc.create_element(row, "span");
            doc.append_text(amount, &self.formatter.format(&line_total));
            let remove = doc.create_element_with_class(row, "button", "remove-from-cart");
            doc.set_attr(remove, "data-id", &line.product.id().to_string());
            doc.append_text(remove, "Remove");
            self.dispatch.bind(remove, EventKind::Click, Action::RemoveFromCart(line.product.id()));
        }

        let total = format!("Total: {}", self.formatter.format(&total));
        self.document.set_text_content(self.regions.cart_total, &total);
        Ok(())
    }

    /// Opens checkout for a single product.
    pub fn go_to_payment(&mut self, id: ProductId) -> Result<()> {
        let product = self.catalog.get(id).ok_or(StorefrontError::ProductNotFound(id))?;
        let url = self.checkout.single(product);
        tracing::info!(session = %self.session, product_id = %id, "checkout handoff (single item)");
        self.host.open_new(&url);
        Ok(())
    }

    /// Opens checkout for the whole cart, or warns when it is empty.
    pub fn buy_all(&mut self) -> Result<()> {
        if self.cart.is_empty() {
            self.host.notify(CART_EMPTY);
            return Ok(());
        }
        let url = self.checkout.cart(&self.cart, &self.catalog)?;
        tracing::info!(session = %self.session, lines = self.cart.len(), "checkout handoff (cart)");
        self.host.open_new(&url);
        Ok(())
    }

    /// Asks for a demo video URL and opens it if given, then always shows the reviews.
    pub fn view_reviews_and_videos(&mut self, id: ProductId) -> Result<()> {
        let summary = self.catalog.get(id).ok_or(StorefrontError::ProductNotFound(id))?.review_summary();
        if let Some(url) = self.host.prompt(VIDEO_PROMPT).filter(|u| !u.is_empty()) {
            tracing::debug!(session = %self.session, product_id = %id, "opening demo video");
            self.host.open_new(&url);
        }
        self.host.notify(&summary);
        Ok(())
    }

    /// Asks for review text; empty or cancelled input changes nothing.
    pub fn add_review(&mut self, id: ProductId) -> Result<()> {
        self.ensure_product(id)?;
        let Some(review) = self.host.prompt(REVIEW_PROMPT).filter(|r| !r.is_empty()) else { return Ok(()) };
        if let Some(product) = self.catalog.get_mut(id) {
            product.add_review(review);
        }
        self.host.notify(REVIEW_ADDED);
        self.flush_events();
        Ok(())
    }

    fn ensure_product(&self, id: ProductId) -> Result<()> {
        match self.catalog.get(id) {
            Some(_) => Ok(()),
            None => Err(StorefrontError::ProductNotFound(id)),
        }
    }

    fn flush_events(&mut self) {
        for event in self.cart.take_events().into_iter().chain(self.catalog.take_events()) {
            tracing::debug!(session = %self.session, ?event, "domain event");
        }
    }
}

fn build_skeleton(doc: &mut Document, catalog: &Catalog) -> Regions {
    let app = doc.create_element_with_class(doc.root(), "div", "storefront");
    let controls = doc.create_element_with_class(app, "div", "controls");

    let sort_select = doc.create_element(controls, "select");
    doc.set_attr(sort_select, "id", "sort-options");
    for criteria in SortCriteria::OPTIONS {
        let option = doc.create_element(sort_select, "option");
        doc.set_attr(option, "value", criteria.as_str());
        doc.append_text(option, criteria.label());
    }

    let filter_select = doc.create_element(controls, "select");
    doc.set_attr(filter_select, "id", "filter-options");
    let all = doc.create_element(filter_select, "option");
    doc.set_attr(all, "value", CategoryFilter::ALL);
    doc.append_text(all, "All");
    for category in catalog.categories() {
        let option = doc.create_element(filter_select, "option");
        doc.set_attr(option, "value", category);
        doc.append_text(option, category);
    }

    let product_grid = doc.create_element_with_class(app, "div", "product-grid");
    let cart = doc.create_element_with_class(app, "div", "cart");
    let heading = doc.create_element(cart, "h2");
    doc.append_text(heading, "Cart");
    let cart_items = doc.create_element_with_class(cart, "div", "cart-items");
    let cart_total = doc.create_element_with_class(cart, "div", "cart-total");
    let buy_all = doc.create_element_with_class(cart, "button", "buy-all-button");
    doc.append_text(buy_all, "Buy All");

    Regions { sort_select, filter_select, product_grid, cart_items, cart_total, buy_all }
}

/// Marks the option carrying `value` as selected on a select element.
fn select_option(doc: &mut Document, select: NodeId, value: &str) {
    if doc.tag_name(select) != Some("select") { return; }
    for option in doc.children(select).to_vec() {
        if doc.attr(option, "value") == Some(value) {
            doc.set_attr(option, "selected", "selected");
        } else {
            doc.remove_attr(option, "selected");
        }
    }
}
