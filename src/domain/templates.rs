//! Bilingual order notification wording.

use chrono::{DateTime, Utc};

use super::money::Money;
use super::notification::{Brand, EmailMessage, NotificationKind, PushMessage};
use super::user::Language;

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_SHIPPING_PARTNER: &str = "Standard Shipping";

/// Deployment-wide inputs shared by every template.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    pub brand: Brand,
    pub base_url: String,
}

impl TemplateContext {
    pub fn tracking_link(&self, order_number: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            tracking_path(order_number)
        )
    }
}

pub fn tracking_path(order_number: &str) -> String {
    format!("/track-order?orderNumber={}", order_number)
}

/// Facts about one order at the moment a notification is rendered.
#[derive(Debug, Clone)]
pub struct OrderFacts {
    pub customer_name: String,
    pub customer_email: String,
    pub language: Language,
    pub order_number: String,
    pub event_date: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub tracking_number: Option<String>,
    pub shipping_partner: Option<String>,
    pub delivery_agent: Option<String>,
    pub total_amount: Money,
}

impl OrderFacts {
    fn tracking_number(&self) -> &str {
        self.tracking_number.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    fn shipping_partner(&self) -> &str {
        self.shipping_partner
            .as_deref()
            .unwrap_or(DEFAULT_SHIPPING_PARTNER)
    }

    fn delivery_agent(&self) -> &str {
        self.delivery_agent.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

struct Wording {
    subject: String,
    greeting: String,
    lines: Vec<String>,
    closing: Vec<String>,
}

pub fn render_email(kind: NotificationKind, ctx: &TemplateContext, facts: &OrderFacts) -> EmailMessage {
    let wording = match facts.language {
        Language::En => english(kind, ctx, facts),
        Language::Hi => hindi(kind, ctx, facts),
    };

    let mut text = vec![wording.greeting.clone(), String::new()];
    text.extend(wording.lines.iter().cloned());
    text.push(String::new());
    text.extend(wording.closing.iter().cloned());

    let mut html = format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
         <h2 style=\"color: #d97706;\">{}</h2>",
        escape(&wording.greeting)
    );
    for line in wording.lines.iter().filter(|l| !l.is_empty()) {
        html.push_str(&format!("<p>{}</p>", escape(line)));
    }
    let closing: Vec<String> = wording.closing.iter().map(|l| escape(l)).collect();
    html.push_str(&format!("<p>{}</p></div>", closing.join("<br>")));

    EmailMessage {
        to: facts.customer_email.clone(),
        subject: wording.subject,
        text: text.join("\n"),
        html,
    }
}

fn english(kind: NotificationKind, ctx: &TemplateContext, f: &OrderFacts) -> Wording {
    let brand = ctx.brand.short_name(Language::En);
    let marketplace = ctx.brand.marketplace_name(Language::En);
    let n = &f.order_number;
    let thanks = format!("Thank you for shopping with {}!", marketplace);
    let closing = vec!["Best regards,".to_string(), format!("The {} Team", brand)];

    let (subject, lines) = match kind {
        NotificationKind::OrderConfirmation => (
            format!("Order Confirmation – {}", marketplace),
            vec![
                format!("Thank you for your order #{}. Your product(s) will be shipped soon.", n),
                format!("Track your order here: {}", ctx.tracking_link(n)),
            ],
        ),
        NotificationKind::OrderShipped => (
            format!("Your {} Order #{} has been Shipped!", brand, n),
            vec![
                format!("Great news! Your order #{} has been shipped and is on its way to you.", n),
                String::new(),
                "Order Details:".to_string(),
                format!("- Order ID: #{}", n),
                format!("- Shipped Date: {}", format_date(f.event_date)),
                format!("- Tracking Number: {}", f.tracking_number()),
                format!("- Shipping Partner: {}", f.shipping_partner()),
                String::new(),
                format!("Estimated Delivery Date: {}", format_date(f.estimated_delivery)),
                String::new(),
                thanks,
            ],
        ),
        NotificationKind::OrderOutForDelivery => (
            format!("Your {} Order #{} is Out for Delivery!", brand, n),
            vec![
                format!("Your order #{} is out for delivery and will reach you soon!", n),
                String::new(),
                "Order Details:".to_string(),
                format!("- Order ID: #{}", n),
                format!("- Out for Delivery Date: {}", format_date(f.event_date)),
                format!("- Tracking Number: {}", f.tracking_number()),
                format!("- Delivery Executive: {}", f.delivery_agent()),
                String::new(),
                format!("Please keep ₹{} ready for cash on delivery.", f.total_amount),
                "Expected Delivery Time: Today".to_string(),
                String::new(),
                thanks,
            ],
        ),
        NotificationKind::OrderDelivered => (
            format!("Your {} Order #{} has been Delivered!", brand, n),
            vec![
                format!("We're happy to inform you that your order #{} has been successfully delivered!", n),
                String::new(),
                "Order Details:".to_string(),
                format!("- Order ID: #{}", n),
                format!("- Delivered Date: {}", format_date(f.event_date)),
                format!("- Total Amount: ₹{}", f.total_amount),
                String::new(),
                "If you have any feedback or need assistance, please feel free to contact us.".to_string(),
                String::new(),
                thanks,
            ],
        ),
    };

    Wording {
        subject,
        greeting: format!("Hello {},", f.customer_name),
        lines,
        closing,
    }
}

fn hindi(kind: NotificationKind, ctx: &TemplateContext, f: &OrderFacts) -> Wording {
    let brand = ctx.brand.short_name(Language::Hi);
    let marketplace = ctx.brand.marketplace_name(Language::Hi);
    let n = &f.order_number;
    let thanks = format!("{} के साथ खरीदारी करने के लिए धन्यवाद!", marketplace);
    let closing = vec!["सादर,".to_string(), format!("{} टीम", brand)];

    let (subject, lines) = match kind {
        NotificationKind::OrderConfirmation => (
            format!("ऑर्डर की पुष्टि – {}", marketplace),
            vec![
                format!("आपका ऑर्डर #{} सफलतापूर्वक प्राप्त हो गया है। आपका प्रोडक्ट जल्द ही भेज दिया जाएगा।", n),
                format!("अपना ऑर्डर यहाँ ट्रैक करें: {}", ctx.tracking_link(n)),
            ],
        ),
        NotificationKind::OrderShipped => (
            format!("आपका {} ऑर्डर #{} भेज दिया गया है!", brand, n),
            vec![
                format!("बहुत अच्छी खबर! आपका ऑर्डर #{} भेज दिया गया है और आपके पास आ रहा है।", n),
                String::new(),
                "ऑर्डर विवरण:".to_string(),
                format!("- ऑर्डर आईडी: #{}", n),
                format!("- भेजे गए तिथि: {}", format_date(f.event_date)),
                format!("- ट्रैकिंग नंबर: {}", f.tracking_number()),
                format!("- शिपिंग साझेदार: {}", f.shipping_partner()),
                String::new(),
                format!("अनुमानित डिलीवरी तिथि: {}", format_date(f.estimated_delivery)),
                String::new(),
                thanks,
            ],
        ),
        NotificationKind::OrderOutForDelivery => (
            format!("आपका {} ऑर्डर #{} डिलीवरी के लिए निकला है!", brand, n),
            vec![
                format!("आपका ऑर्डर #{} डिलीवरी के लिए निकल गया है और जल्द ही आप तक पहुंच जाएगा!", n),
                String::new(),
                "ऑर्डर विवरण:".to_string(),
                format!("- ऑर्डर आईडी: #{}", n),
                format!("- डिलीवरी के लिए निकले की तिथि: {}", format_date(f.event_date)),
                format!("- ट्रैकिंग नंबर: {}", f.tracking_number()),
                format!("- डिलीवरी कार्यकर्ता: {}", f.delivery_agent()),
                String::new(),
                format!("कृपया कैश ऑन डिलीवरी के लिए ₹{} तैयार रखें।", f.total_amount),
                "अपेक्षित डिलीवरी समय: आज".to_string(),
                String::new(),
                thanks,
            ],
        ),
        NotificationKind::OrderDelivered => (
            format!("आपका {} ऑर्डर #{} डिलीवर हो गया है!", brand, n),
            vec![
                format!("हम आपको सूचित करने में खुशी महसूस करते हैं कि आपका ऑर्डर #{} सफलतापूर्वक डिलीवर हो गया है!", n),
                String::new(),
                "ऑर्डर विवरण:".to_string(),
                format!("- ऑर्डर आईडी: #{}", n),
                format!("- डिलीवर की तिथि: {}", format_date(f.event_date)),
                format!("- कुल राशि: ₹{}", f.total_amount),
                String::new(),
                "यदि आपके कोई प्रतिक्रिया है या सहायता की आवश्यकता है, तो कृपया हमसे संपर्क करें।".to_string(),
                String::new(),
                thanks,
            ],
        ),
    };

    Wording {
        subject,
        greeting: format!("नमस्ते {},", f.customer_name),
        lines,
        closing,
    }
}

/// Browser push wording. Order confirmation goes out by email only.
pub fn render_push(kind: NotificationKind, language: Language, order_number: &str) -> Option<PushMessage> {
    let (title, body, tag) = match (kind, language) {
        (NotificationKind::OrderConfirmation, _) => return None,
        (NotificationKind::OrderShipped, Language::En) => (
            "Order Shipped",
            format!("Your order #{} has been shipped!", order_number),
            "order-shipped",
        ),
        (NotificationKind::OrderShipped, Language::Hi) => (
            "ऑर्डर भेज दिया गया",
            format!("आपका ऑर्डर #{} भेज दिया गया है!", order_number),
            "order-shipped",
        ),
        (NotificationKind::OrderOutForDelivery, Language::En) => (
            "Out for Delivery",
            format!("Your order #{} is out for delivery.", order_number),
            "order-out-for-delivery",
        ),
        (NotificationKind::OrderOutForDelivery, Language::Hi) => (
            "डिलीवरी के लिए निकला",
            format!("आपका ऑर्डर #{} डिलीवरी के लिए निकला है।", order_number),
            "order-out-for-delivery",
        ),
        (NotificationKind::OrderDelivered, Language::En) => (
            "Order Delivered",
            format!("Your order #{} has been delivered.", order_number),
            "order-delivered",
        ),
        (NotificationKind::OrderDelivered, Language::Hi) => (
            "ऑर्डर डिलीवर हो गया",
            format!("आपका ऑर्डर #{} डिलीवर हो गया है।", order_number),
            "order-delivered",
        ),
    };

    Some(PushMessage {
        title: title.to_string(),
        body,
        tag: format!("{}-{}", tag, order_number),
        click_target: tracking_path(order_number),
    })
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
