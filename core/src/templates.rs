//! Built-in product description fragments. They are plain markup and go
//! through `fragment:insert` like any other pasted content.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub content: &'static str,
}

const CATALOGUE: &[Template] = &[
    Template {
        id: "product-features",
        name: "Product Features",
        content: r#"<h3>Key Features</h3>
<ul data-list-style="check">
  <li><strong>Built to last:</strong> durable materials chosen for everyday use</li>
  <li><strong>Quick:</strong> tuned for responsive, efficient operation</li>
  <li><strong>Clean design:</strong> a modern look that suits any room</li>
  <li><strong>Simple setup:</strong> ready to go in a few minutes</li>
</ul>"#,
    },
    Template {
        id: "specifications",
        name: "Product Specifications",
        content: r#"<h3>Specifications</h3>
<table>
  <tr><th>Dimensions</th><td>38 x 30 x 20 cm</td></tr>
  <tr><th>Weight</th><td>1.1 kg</td></tr>
  <tr><th>Material</th><td>Anodized aluminium</td></tr>
  <tr><th>Colours</th><td>Graphite, Silver, Sand</td></tr>
  <tr><th>Warranty</th><td>Two years, limited</td></tr>
</table>"#,
    },
    Template {
        id: "shipping-returns",
        name: "Shipping & Returns",
        content: r#"<h3>Shipping &amp; Returns</h3>
<h4>Shipping</h4>
<ul>
  <li>Free delivery on orders over $50</li>
  <li>Standard delivery in 3 to 5 business days</li>
  <li>Express delivery in 1 to 2 business days</li>
  <li>We ship to most countries</li>
</ul>
<h4>Returns</h4>
<ul>
  <li>Returns accepted within 30 days</li>
  <li>Defective items are returned free of charge</li>
  <li>Items must come back in their original condition</li>
  <li>Refunds are issued within 7 business days</li>
</ul>"#,
    },
    Template {
        id: "customer-reviews",
        name: "Customer Reviews",
        content: r#"<h3>Customer Reviews</h3>
<p><strong>Priya K.</strong> <span style="color: #f59e0b">★★★★★</span></p>
<p><em>"Solid build and it arrived two days early. Exactly as described."</em></p>
<p><strong>Marco L.</strong> <span style="color: #f59e0b">★★★★★</span></p>
<p><em>"Good value. Support answered my setup question within the hour."</em></p>
<p><strong>Hana S.</strong> <span style="color: #f59e0b">★★★★☆</span></p>
<p><em>"Does everything I need and looks great on my desk."</em></p>"#,
    },
    Template {
        id: "warranty-support",
        name: "Warranty & Support",
        content: r#"<h3>Warranty &amp; Support</h3>
<h4>Warranty</h4>
<ul>
  <li><strong>Two-year limited warranty</strong> against manufacturing defects</li>
  <li>Parts and labour included</li>
  <li>Coverage starts on the date of purchase</li>
</ul>
<h4>Support</h4>
<ul>
  <li>Phone support around the clock</li>
  <li>Live chat on our website</li>
  <li>Guides and answers to common questions</li>
</ul>
<p style="text-align: center"><strong>Need help?</strong> support@example.com</p>"#,
    },
    Template {
        id: "product-comparison",
        name: "Product Comparison",
        content: r#"<h3>Compare Models</h3>
<table>
  <thead><tr><th>Feature</th><th>Basic</th><th>Pro</th><th>Premium</th></tr></thead>
  <tbody>
    <tr><td>Price</td><td>$99</td><td>$149</td><td>$199</td></tr>
    <tr><td>Warranty</td><td>1 year</td><td>2 years</td><td>3 years</td></tr>
    <tr><td>Priority support</td><td>No</td><td>Yes</td><td>Yes</td></tr>
  </tbody>
</table>"#,
    },
];

pub fn catalogue() -> &'static [Template] {
    CATALOGUE
}

pub fn get(id: &str) -> Option<&'static Template> {
    CATALOGUE.iter().find(|t| t.id == id)
}
