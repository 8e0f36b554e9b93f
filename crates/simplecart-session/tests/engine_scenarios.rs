//! End-to-end cart scenarios: engine + adapters + config.

use simplecart_core::{variant_hash, CoreError, SkipReason};
use simplecart_session::{
    AttributeSet, CartConfig, CartEngine, CartError, CartIdentity, CookieJar, FileSession,
    MemoryArchive, MemorySession, PersistenceAdapter, PersistenceMode, StoreLimits, WireFormat,
};

fn attrs(pairs: &[(&str, &str)]) -> AttributeSet {
    pairs.iter().copied().collect()
}

fn gold() -> AttributeSet {
    attrs(&[("color", "gold"), ("price", "349.00")])
}

fn identity() -> CartIdentity {
    CartIdentity::from_seed(Some("shop.example.com"))
}

// ============================================================================
// Limits
// ============================================================================

#[test]
fn add_clamps_to_item_max_quantity() {
    let config = CartConfig::from_options([("itemMaxQuantity", "5")]);
    let mut cart = CartEngine::open(&config, MemorySession::new()).unwrap();

    cart.add("100", 3, gold()).unwrap();
    assert_eq!(cart.add("100", 4, gold()).unwrap(), 5);

    assert_eq!(cart.total_item(), 1);
    assert_eq!(cart.get_item("100", None).unwrap().quantity, 5);
    assert_eq!(cart.attribute_total("price").to_string(), "1745.00");
}

#[test]
fn cart_max_item_rejects_new_ids_only() {
    let config = CartConfig::from_options([("cartMaxItem", "1")]);
    let mut cart = CartEngine::open(&config, MemorySession::new()).unwrap();

    cart.add("100", 1, AttributeSet::new()).unwrap();
    let err = cart.add("101", 1, AttributeSet::new()).unwrap_err();
    assert!(matches!(err, CartError::Core(CoreError::LimitExceeded { max: 1 })));

    // Same id, new variant: allowed
    cart.add("100", 1, gold()).unwrap();
    assert_eq!(cart.total_item(), 2);
    assert!(!cart.is_item_exists("101", &AttributeSet::new()));
}

#[test]
fn update_zero_removes_variant() {
    let mut cart = CartEngine::open(&CartConfig::default(), MemorySession::new()).unwrap();
    cart.add("100", 2, gold()).unwrap();
    cart.add("100", 1, attrs(&[("color", "silver")])).unwrap();

    assert_eq!(cart.update("100", 0, &gold()).unwrap(), 0);
    assert!(!cart.is_item_exists("100", &gold()));
    assert_eq!(cart.total_item(), 1);

    let err = cart.update("999", 1, &AttributeSet::new()).unwrap_err();
    assert!(err.is_not_found());
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn cart_survives_between_requests() {
    for format in [WireFormat::Structured, WireFormat::Delimited] {
        let mut session = MemorySession::new();

        {
            let mut cart =
                CartEngine::open_with(identity(), StoreLimits::unlimited(), format, &mut session).unwrap();
            cart.add("100", 3, gold()).unwrap();
            cart.add("100", 1, attrs(&[("color", "silver")])).unwrap();
            cart.add("205", 2, AttributeSet::new()).unwrap();
        }

        let cart =
            CartEngine::open_with(identity(), StoreLimits::unlimited(), format, &mut session).unwrap();
        assert_eq!(cart.total_item(), 3, "format {}", format);
        assert_eq!(cart.total_quantity(), 6);
        assert_eq!(
            cart.get_item("100", Some(&variant_hash(&gold()))).unwrap().quantity,
            3
        );
        let ids: Vec<&str> = cart.items().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["100", "205"]);
    }
}

#[test]
fn malformed_delimited_records_are_dropped() {
    let session: MemorySession = [(identity().slot().to_string(), "100,2;bad-segment;101,1".to_string())]
        .into_iter()
        .collect();

    let cart =
        CartEngine::open_with(identity(), StoreLimits::unlimited(), WireFormat::Delimited, session).unwrap();

    assert_eq!(cart.total_item(), 2);
    assert_eq!(cart.get_item("100", None).unwrap().quantity, 2);
    assert_eq!(cart.get_item("101", None).unwrap().quantity, 1);
}

#[test]
fn decode_skips_are_reported_by_the_codec() {
    let decoded = WireFormat::Delimited
        .codec()
        .decode(Some("100,2;bad-segment;101,1"), None);
    assert_eq!(decoded.skipped.len(), 1);
    assert_eq!(decoded.skipped[0].reason, SkipReason::MissingDelimiter);
}

#[test]
fn clear_keeps_slot_destroy_deletes_it() {
    let mut session = MemorySession::new();
    let slot = identity().slot().to_string();
    let attributes_slot = identity().attributes_slot();

    {
        let mut cart = CartEngine::open_with(
            identity(),
            StoreLimits::unlimited(),
            WireFormat::Delimited,
            &mut session,
        )
        .unwrap();
        cart.add("100", 1, gold()).unwrap();
        cart.clear().unwrap();
        assert!(cart.is_empty());
    }
    assert_eq!(session.read_raw(&slot).unwrap().as_deref(), Some(""));
    assert!(session.contains(&attributes_slot));

    {
        let mut cart = CartEngine::open_with(
            identity(),
            StoreLimits::unlimited(),
            WireFormat::Delimited,
            &mut session,
        )
        .unwrap();
        cart.add("100", 1, gold()).unwrap();
        cart.destroy().unwrap();
        assert!(cart.is_empty());
    }
    assert!(!session.contains(&slot));
    assert!(!session.contains(&attributes_slot));
}

#[test]
fn file_session_keeps_cart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let config = CartConfig::from_options([("seed", "cli")]);

    {
        let session = FileSession::open(dir.path()).unwrap();
        let mut cart = CartEngine::open(&config, session).unwrap();
        cart.add_input("100", "2", gold()).unwrap();
    }

    let session = FileSession::open(dir.path()).unwrap();
    let cart = CartEngine::open(&config, session).unwrap();
    assert_eq!(cart.total_quantity(), 2);
    assert_eq!(cart.attribute_total("price").to_string(), "698.00");
}

// ============================================================================
// Cookies
// ============================================================================

#[test]
fn cookie_cart_round_trips_through_headers() {
    let config = CartConfig::from_options([("useCookie", "1"), ("format", "delimited"), ("seed", "shop")]);
    assert_eq!(config.mode(), PersistenceMode::Cookie);

    let mut cart = CartEngine::open(&config, CookieJar::default()).unwrap();
    cart.add("100", 2, attrs(&[("color", "gold leaf")])).unwrap();
    let headers = cart.into_adapter().set_cookie_headers();
    assert_eq!(headers.len(), 2);
    assert!(headers.iter().all(|h| h.contains("; Path=/; Expires=")));

    // The browser sends back name=value pairs
    let request_header = headers
        .iter()
        .map(|h| h.split(';').next().unwrap_or_default())
        .collect::<Vec<_>>()
        .join("; ");
    let jar = CookieJar::from_request_header(&request_header, "/", 7);
    let cart = CartEngine::open(&config, jar).unwrap();

    assert!(cart.is_item_exists("100", &attrs(&[("color", "gold leaf")])));
    assert_eq!(cart.total_quantity(), 2);
}

#[test]
fn oversize_cookie_leaves_cart_unchanged() {
    for format in ["structured", "delimited"] {
        let config = CartConfig::from_options([("useCookie", "true"), ("format", format)]);
        let mut cart = CartEngine::open(&config, CookieJar::default()).unwrap();
        cart.add("100", 1, attrs(&[("color", "gold")])).unwrap();

        let engraving = "x".repeat(5000);
        let err = cart
            .add("100", 1, attrs(&[("engraving", engraving.as_str())]))
            .unwrap_err();

        assert!(err.is_persistence(), "format {}", format);
        assert_eq!(cart.total_item(), 1);

        // The next request only sees what the response actually set
        let request_header = cart
            .into_adapter()
            .set_cookie_headers()
            .iter()
            .map(|h| h.split(';').next().unwrap_or_default().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let jar = CookieJar::from_request_header(&request_header, "/", 7);
        let next = CartEngine::open(&config, jar).unwrap();

        assert_eq!(next.total_item(), 1, "format {}", format);
        assert_eq!(next.total_quantity(), 1);
        assert!(next.is_item_exists("100", &attrs(&[("color", "gold")])));
    }
}

// ============================================================================
// Archive
// ============================================================================

#[test]
fn archive_and_restore() {
    let mut archive = MemoryArchive::new();

    let mut cart = CartEngine::open(&CartConfig::default(), MemorySession::new()).unwrap();
    cart.add("100", 4, gold()).unwrap();
    cart.archive_to(&mut archive).unwrap();
    cart.destroy().unwrap();
    assert!(cart.is_empty());

    assert!(cart.restore_from(&archive).unwrap());
    assert_eq!(cart.total_quantity(), 4);

    // Restored cart is persisted, not only in memory
    let session = cart.into_adapter();
    let reopened = CartEngine::open(&CartConfig::default(), session).unwrap();
    assert_eq!(reopened.total_quantity(), 4);

    let mut other = CartEngine::open(
        &CartConfig::from_options([("sessionId", "someone-else")]),
        MemorySession::new(),
    )
    .unwrap();
    assert!(!other.restore_from(&archive).unwrap());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn config_file_drives_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.toml");
    std::fs::write(
        &path,
        "[cart]\nmax_items = 2\nmax_item_quantity = 3\n\n[persistence]\nformat = \"delimited\"\n\n[identity]\nsession_id = \"checkout.1\"\n",
    )
    .unwrap();

    let config = CartConfig::load(Some(path)).unwrap();
    assert_eq!(config.limits(), StoreLimits::new(2, 3));

    let mut cart = CartEngine::open(&config, MemorySession::new()).unwrap();
    assert_eq!(cart.identity().as_str(), "checkout_1");
    assert_eq!(cart.format(), WireFormat::Delimited);
    assert_eq!(cart.add("100", 10, AttributeSet::new()).unwrap(), 3);
}

#[test]
fn config_save_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("cart.toml");

    let mut config = CartConfig::default();
    config.cart.max_items = 7;
    config.identity.seed = Some("shop.example.com".into());
    config.save(Some(path.clone())).unwrap();

    let reloaded: CartConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn invalid_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cart.toml");
    std::fs::write(&path, "[persistence]\nmode = \"carrier-pigeon\"\n").unwrap();

    assert!(CartConfig::load(Some(path.clone())).is_err());
    assert_eq!(CartConfig::load_or_default(Some(path)).mode(), PersistenceMode::Session);
}
