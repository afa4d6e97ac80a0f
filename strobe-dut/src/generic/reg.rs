//! clocked register

/// a register whose driven value becomes visible at the next clock edge
#[derive(Debug, Clone, Copy)]
pub struct Reg<T: Copy + Default> {
    data: T,
    next: Option<T>,
}

impl<T: Copy + Default> Reg<T> {
    pub fn new(init: T) -> Self {
        Self { data: init, next: None }
    }

    /// drive the input; effective at the next [`Reg::update`]
    pub fn drive(&mut self, val: T) {
        self.next = Some(val)
    }

    /// current output
    pub fn sample(&self) -> T {
        self.data
    }

    /// simulate a clock edge
    pub fn update(&mut self) {
        if let Some(next) = self.next.take() {
            self.data = next;
        }
    }
}

impl<T: Copy + Default> Default for Reg<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
