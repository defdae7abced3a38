use std::io;

/// Something that can show a URL to the user, usually by launching a browser.
///
/// Launching is fire-and-forget: success only means the request was handed
/// off, not that the user saw anything.
pub trait Opener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Opens URLs in the system's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserOpener;

impl Opener for BrowserOpener {
    fn open(&self, url: &str) -> io::Result<()> {
        webbrowser::open(url)
    }
}

/// Never launches anything. For headless environments, where the printed
/// URL is the only way in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOpener;

impl Opener for NoopOpener {
    fn open(&self, _url: &str) -> io::Result<()> {
        Ok(())
    }
}

impl<O: Opener + ?Sized> Opener for &O {
    fn open(&self, url: &str) -> io::Result<()> {
        (**self).open(url)
    }
}

impl<O: Opener + ?Sized> Opener for Box<O> {
    fn open(&self, url: &str) -> io::Result<()> {
        (**self).open(url)
    }
}
