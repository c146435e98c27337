quantity!(Hours, "h", 1);

impl Hours {
    /// Every simulation step lasts exactly one hour.
    pub const ONE: Self = Self(1.0);
}
