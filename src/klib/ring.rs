//! Ring Buffer
//!
//! Buffer circular de capacidade fixa, sem alocação. Os elementos são
//! movidos para dentro e para fora (posse única).

pub struct RingBuffer<T, const N: usize> {
    buffer: [Option<T>; N],
    read_pos: usize,
    write_pos: usize,
    count: usize,
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Cria novo buffer vazio
    pub fn new() -> Self {
        Self {
            buffer: ::core::array::from_fn(|_| None),
            read_pos: 0,
            write_pos: 0,
            count: 0,
        }
    }

    /// Adiciona elemento. Cheio => devolve o elemento.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.count == N {
            return Err(item);
        }
        self.buffer[self.write_pos] = Some(item);
        self.write_pos = (self.write_pos + 1) % N;
        self.count += 1;
        Ok(())
    }

    /// Remove e retorna o elemento mais antigo
    pub fn pop(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let item = self.buffer[self.read_pos].take();
        self.read_pos = (self.read_pos + 1) % N;
        self.count -= 1;
        item
    }

    /// Retorna número de elementos no buffer
    pub fn len(&self) -> usize {
        self.count
    }

    /// Verifica se buffer está vazio
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
