//! Thin wrappers over the libc socket calls used by the SCTP transport

use std::io;
use std::mem;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::time::Duration;

use libc::{c_int, c_void, sockaddr, sockaddr_in, sockaddr_in6, sockaddr_storage, socklen_t};

/// SCTP socket option level
pub const SOL_SCTP: c_int = 132;
/// SCTP_INITMSG socket option
pub const SCTP_INITMSG: c_int = 2;
/// SCTP_NODELAY socket option
pub const SCTP_NODELAY: c_int = 3;
/// SCTP_SNDRCV ancillary data type
pub const SCTP_SNDRCV: c_int = 1;

/// struct sctp_initmsg
#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct SctpInitmsg {
    pub sinit_num_ostreams: u16,
    pub sinit_max_instreams: u16,
    pub sinit_max_attempts: u16,
    pub sinit_max_init_timeo: u16,
}

/// struct sctp_sndrcvinfo
#[repr(C)]
#[derive(Debug, Clone, Default)]
pub struct SctpSndRcvInfo {
    pub sinfo_stream: u16,
    pub sinfo_ssn: u16,
    pub sinfo_flags: u16,
    pub sinfo_ppid: u32,
    pub sinfo_context: u32,
    pub sinfo_timetolive: u32,
    pub sinfo_tsn: u32,
    pub sinfo_cumtsn: u32,
    pub sinfo_assoc_id: i32,
}

/// Opens a one-to-one (SOCK_STREAM) SCTP socket for the family of `addr`.
pub fn sctp_socket(addr: &SocketAddr) -> io::Result<OwnedFd> {
    let family = match addr {
        SocketAddr::V4(_) => libc::AF_INET,
        SocketAddr::V6(_) => libc::AF_INET6,
    };
    let fd = unsafe { libc::socket(family, libc::SOCK_STREAM, libc::IPPROTO_SCTP) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

/// Binds `fd` to `addr`.
pub fn bind(fd: &OwnedFd, addr: &SocketAddr) -> io::Result<()> {
    let (storage, len) = to_sockaddr(addr);
    if unsafe { libc::bind(fd.as_raw_fd(), &storage as *const _ as *const sockaddr, len) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub fn to_sockaddr(addr: &SocketAddr) -> (sockaddr_storage, socklen_t) {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };
    let len = match addr {
        SocketAddr::V4(v4) => {
            let sin = unsafe { &mut *(&mut storage as *mut _ as *mut sockaddr_in) };
            sin.sin_family = libc::AF_INET as libc::sa_family_t;
            sin.sin_port = v4.port().to_be();
            sin.sin_addr.s_addr = u32::from_ne_bytes(v4.ip().octets());
            mem::size_of::<sockaddr_in>()
        }
        SocketAddr::V6(v6) => {
            let sin6 = unsafe { &mut *(&mut storage as *mut _ as *mut sockaddr_in6) };
            sin6.sin6_family = libc::AF_INET6 as libc::sa_family_t;
            sin6.sin6_port = v6.port().to_be();
            sin6.sin6_flowinfo = v6.flowinfo();
            sin6.sin6_addr.s6_addr = v6.ip().octets();
            sin6.sin6_scope_id = v6.scope_id();
            mem::size_of::<sockaddr_in6>()
        }
    };
    (storage, len as socklen_t)
}

pub fn from_sockaddr(storage: &sockaddr_storage, len: socklen_t) -> Option<SocketAddr> {
    let family = c_int::from(storage.ss_family);
    if family == libc::AF_INET && len as usize >= mem::size_of::<sockaddr_in>() {
        let sin = unsafe { &*(storage as *const _ as *const sockaddr_in) };
        let ip = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
        Some(SocketAddr::new(IpAddr::V4(ip), u16::from_be(sin.sin_port)))
    } else if family == libc::AF_INET6 && len as usize >= mem::size_of::<sockaddr_in6>() {
        let sin6 = unsafe { &*(storage as *const _ as *const sockaddr_in6) };
        let ip = Ipv6Addr::from(sin6.sin6_addr.s6_addr);
        Some(SocketAddr::new(IpAddr::V6(ip), u16::from_be(sin6.sin6_port)))
    } else {
        None
    }
}

pub fn setsockopt<T>(fd: &OwnedFd, level: c_int, name: c_int, value: &T) -> io::Result<()> {
    let result = unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            level,
            name,
            value as *const T as *const c_void,
            mem::size_of::<T>() as socklen_t,
        )
    };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub fn set_nonblocking(fd: &OwnedFd, nonblocking: bool) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    let flags = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };
    if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// SO_RCVTIMEO; a zero duration blocks forever
pub fn set_recv_timeout(fd: &OwnedFd, timeout: Duration) -> io::Result<()> {
    let tv = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };
    setsockopt(fd, libc::SOL_SOCKET, libc::SO_RCVTIMEO, &tv)
}

/// Connects `fd` to `addr`, giving up after `timeout`.
///
/// The socket is switched to non-blocking for the duration of the connect and
/// restored to blocking afterwards.
pub fn connect_timeout(fd: &OwnedFd, addr: &SocketAddr, timeout: Duration) -> io::Result<()> {
    let (storage, len) = to_sockaddr(addr);
    set_nonblocking(fd, true)?;

    let result = unsafe {
        libc::connect(fd.as_raw_fd(), &storage as *const _ as *const sockaddr, len)
    };
    if result < 0 {
        let err = io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::EINPROGRESS) {
            return Err(err);
        }

        let mut pfd = libc::pollfd {
            fd: fd.as_raw_fd(),
            events: libc::POLLOUT,
            revents: 0,
        };
        let millis = c_int::try_from(timeout.as_millis()).unwrap_or(c_int::MAX);
        let ready = unsafe { libc::poll(&mut pfd, 1, millis) };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out"));
        }

        let mut so_error: c_int = 0;
        let mut so_len = mem::size_of::<c_int>() as socklen_t;
        let result = unsafe {
            libc::getsockopt(
                fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_ERROR,
                &mut so_error as *mut _ as *mut c_void,
                &mut so_len,
            )
        };
        if result < 0 {
            return Err(io::Error::last_os_error());
        }
        if so_error != 0 {
            return Err(io::Error::from_raw_os_error(so_error));
        }
    }

    set_nonblocking(fd, false)
}

/// Sends one message on stream 0 tagged with payload protocol identifier
/// `ppid`, the way `sctp_sendmsg` does.
pub fn send_with_ppid(fd: &OwnedFd, data: &[u8], ppid: u32) -> io::Result<usize> {
    let info = SctpSndRcvInfo {
        // Copied into the DATA chunk unchanged
        sinfo_ppid: ppid.to_be(),
        ..Default::default()
    };
    let info_len = mem::size_of::<SctpSndRcvInfo>() as u32;
    let mut iov = libc::iovec {
        iov_base: data.as_ptr() as *mut c_void,
        iov_len: data.len(),
    };
    // u64 storage keeps the cmsghdr aligned
    let mut control = [0u64; 8];

    let mut msg: libc::msghdr = unsafe { mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = control.as_mut_ptr() as *mut c_void;
    msg.msg_controllen = unsafe { libc::CMSG_SPACE(info_len) } as _;

    unsafe {
        let cmsg = libc::CMSG_FIRSTHDR(&msg);
        if cmsg.is_null() {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "no room for SCTP_SNDRCV"));
        }
        (*cmsg).cmsg_level = SOL_SCTP;
        (*cmsg).cmsg_type = SCTP_SNDRCV;
        (*cmsg).cmsg_len = libc::CMSG_LEN(info_len) as _;
        std::ptr::write_unaligned(libc::CMSG_DATA(cmsg) as *mut SctpSndRcvInfo, info);
    }

    let sent = unsafe { libc::sendmsg(fd.as_raw_fd(), &msg, libc::MSG_NOSIGNAL) };
    if sent < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(sent as usize)
}

pub fn local_addr(fd: &OwnedFd) -> io::Result<SocketAddr> {
    let mut storage: sockaddr_storage = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<sockaddr_storage>() as socklen_t;
    let result = unsafe {
        libc::getsockname(fd.as_raw_fd(), &mut storage as *mut _ as *mut sockaddr, &mut len)
    };
    if result < 0 {
        return Err(io::Error::last_os_error());
    }
    from_sockaddr(&storage, len)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unknown address family"))
}
