use mipsim_core::soc::devices::SerialHost;
use mockall::mock;

mock! {
    pub Host {}
    impl SerialHost for Host {
        fn poll_rx(&mut self) -> Option<u8>;
        fn tx(&mut self, byte: u8);
    }
}
