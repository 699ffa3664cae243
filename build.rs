fn main() {
    // Only the device build links against ESP-IDF; host builds (tests,
    // simulation) skip the sysenv export entirely.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
